//! truncate-sim
//!
//! Truncates an epidemic simulation and its contact-tracing document at a
//! cutoff time.
//!
//! # Exit Codes
//!
//! - 0: Success - both outputs written (also `--help` / `--version`)
//! - 3: Invalid argument or configuration, including unparsable arguments
//! - 4: File not found or inaccessible
//! - 5: Malformed epidemic trace
//! - 6: Malformed contact document
//! - 10: Internal error

use clap::Parser;
use epi_truncate_cli::{run_cli, ExitCode, TruncateCli};

fn main() {
    let cli = match TruncateCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            let code = if e.use_stderr() {
                ExitCode::InvalidInput
            } else {
                ExitCode::Success
            };
            std::process::exit(code.into());
        }
    };

    // Initialize tracing subscriber for logging; RUST_LOG adds directives
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
