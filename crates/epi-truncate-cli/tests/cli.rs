//! End-to-end tests for the truncate-sim binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CONTACTS: &str = r#"<tracedcontacts xmlns="tracedcontacts">
  <contact id="1" start="2.0"><from id="2"><type>fm</type><time>1.0</time></from></contact>
  <contact id="2" start="3.0"/>
  <contact id="3" start="4.0"/>
</tracedcontacts>
"#;

fn truncate_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_truncate-sim"))
        .args(args)
        .env_remove("EPI_TRUNCATE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run truncate-sim")
}

fn write_sim(dir: &Path, trace: &str) {
    std::fs::write(dir.join("sim.ipt"), trace).unwrap();
    std::fs::write(dir.join("sim.contact.xml"), CONTACTS).unwrap();
}

fn path_arg(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[test]
fn test_run_writes_default_outputs() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 5.0 8.0\n2 1.0 12.0 15.0\n3 2.0 4.0 20.0\n");

    let out = truncate_sim(&[
        "run",
        &path_arg(&dir, "sim.ipt"),
        &path_arg(&dir, "sim.contact.xml"),
        "10.0",
        "--format",
        "json",
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let trace = std::fs::read_to_string(dir.path().join("sim.trunc.ipt")).unwrap();
    assert_eq!(trace, "1 0.0 5.0 8.0\n3 2.0 4.0 10.0\n");

    let xml = std::fs::read_to_string(dir.path().join("sim.trunc.contact.xml")).unwrap();
    assert!(xml.contains(r#"<contact id="1""#));
    assert!(!xml.contains(r#"<contact id="2""#));
    assert!(xml.contains(r#"<contact id="3" start="4.0"/>"#));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["records_retained"], 2);
    assert_eq!(report["contacts_removed"], 1);
}

#[test]
fn test_prefix_command() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 5.0 8.0\n2 1.0 12.0 15.0\n");

    let out = truncate_sim(&[
        "-q",
        "prefix",
        &path_arg(&dir, "sim"),
        "10",
        &path_arg(&dir, "cut"),
    ]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("cut.ipt")).unwrap(),
        "1 0.0 5.0 8.0\n"
    );
    assert!(dir.path().join("cut.contact.xml").exists());
}

#[test]
fn test_negative_cutoff_exits_with_invalid_input() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 5.0 8.0\n");

    let out = truncate_sim(&[
        "run",
        &path_arg(&dir, "sim.ipt"),
        &path_arg(&dir, "sim.contact.xml"),
        "-1.0",
    ]);
    assert_eq!(out.status.code(), Some(3));
    assert!(!dir.path().join("sim.trunc.ipt").exists());
    assert!(!dir.path().join("sim.trunc.contact.xml").exists());
}

#[test]
fn test_argument_errors_exit_with_invalid_input() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 5.0 8.0\n");

    let missing_cutoff = truncate_sim(&[
        "run",
        &path_arg(&dir, "sim.ipt"),
        &path_arg(&dir, "sim.contact.xml"),
    ]);
    assert_eq!(missing_cutoff.status.code(), Some(3));
    assert!(!missing_cutoff.stderr.is_empty());

    let bad_cutoff = truncate_sim(&[
        "run",
        &path_arg(&dir, "sim.ipt"),
        &path_arg(&dir, "sim.contact.xml"),
        "ten",
    ]);
    assert_eq!(bad_cutoff.status.code(), Some(3));
    assert!(!dir.path().join("sim.trunc.ipt").exists());

    assert_eq!(truncate_sim(&["frobnicate"]).status.code(), Some(3));
}

#[test]
fn test_help_exits_successfully() {
    let out = truncate_sim(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("run"));
}

#[test]
fn test_malformed_trace_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 5.0 8.0\n2 1.0 x 15.0\n");

    let out = truncate_sim(&[
        "run",
        &path_arg(&dir, "sim.ipt"),
        &path_arg(&dir, "sim.contact.xml"),
        "10",
    ]);
    assert_eq!(out.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 2"));
    assert!(!dir.path().join("sim.trunc.ipt").exists());
    assert!(!dir.path().join("sim.trunc.contact.xml").exists());
}

#[test]
fn test_missing_input_exits_with_file_error() {
    let dir = TempDir::new().unwrap();
    let out = truncate_sim(&[
        "run",
        &path_arg(&dir, "absent.ipt"),
        &path_arg(&dir, "absent.contact.xml"),
        "10",
    ]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn test_batch_with_config_file() {
    let dir = TempDir::new().unwrap();
    write_sim(dir.path(), "1 0.0 1.0 3.0\n2 0.5 2.5 4.0\n3 0.0 0.5 40.0\n");
    let config = dir.path().join("truncate.toml");
    std::fs::write(&config, "batch_fraction = 0.25\n").unwrap();

    let out = truncate_sim(&[
        "--config",
        &config.to_string_lossy(),
        "--format",
        "yaml",
        "batch",
        &dir.path().to_string_lossy(),
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    // cutoff = 0.25 * 40.0
    let trace = std::fs::read_to_string(dir.path().join("sim.trunc.ipt")).unwrap();
    assert_eq!(trace, "1 0.0 1.0 3.0\n2 0.5 2.5 4.0\n3 0.0 0.5 10.0\n");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cutoff: 10.0"));
}
