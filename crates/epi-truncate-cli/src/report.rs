//! Output formatting for truncation summaries
//!
//! Summaries render as a colored table for people, or as JSON / YAML for
//! scripts driving batches of simulations.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use epi_truncate_core::{BatchEntry, Result, TruncateError, TruncationSummary};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// One truncated simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruncationReport {
    pub trace: PathBuf,
    pub contacts: PathBuf,
    pub trace_output: PathBuf,
    pub contacts_output: PathBuf,
    #[serde(flatten)]
    pub summary: TruncationSummary,
}

/// All simulations truncated by one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub simulations: Vec<TruncationReport>,
}

impl TruncationReport {
    pub fn new(
        trace: &Path,
        contacts: &Path,
        trace_output: &Path,
        contacts_output: &Path,
        summary: TruncationSummary,
    ) -> Self {
        Self {
            trace: trace.to_path_buf(),
            contacts: contacts.to_path_buf(),
            trace_output: trace_output.to_path_buf(),
            contacts_output: contacts_output.to_path_buf(),
            summary,
        }
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => print_json(self),
            OutputFormat::Yaml => print_yaml(self),
            OutputFormat::Table => {
                let mut stdout = io::stdout();
                writeln!(stdout).ok();
                writeln!(stdout, "{}", "Truncation Results".cyan().bold()).ok();
                writeln!(stdout, "{}", "=".repeat(60)).ok();
                self.render_table_rows(&mut stdout);
                stdout.flush().ok();
                Ok(())
            }
        }
    }

    fn render_table_rows(&self, stdout: &mut io::Stdout) {
        let s = &self.summary;
        writeln!(stdout).ok();
        writeln!(
            stdout,
            "{} {} {}",
            "+".green(),
            self.trace.display(),
            format!("(cutoff {})", s.cutoff).dimmed()
        )
        .ok();
        writeln!(
            stdout,
            "  {} {} read, {} retained, {} dropped, {} censored",
            "Records: ".dimmed(),
            s.records_read,
            s.records_retained.to_string().green(),
            s.records_dropped().to_string().yellow(),
            s.records_censored.to_string().blue()
        )
        .ok();
        writeln!(
            stdout,
            "  {} {} read, {} retained, {} removed",
            "Contacts:".dimmed(),
            s.contacts_read,
            s.contacts_retained().to_string().green(),
            s.contacts_removed.to_string().yellow()
        )
        .ok();
        writeln!(
            stdout,
            "  {} {}",
            "Wrote:   ".dimmed(),
            self.trace_output.display().to_string().cyan()
        )
        .ok();
        writeln!(
            stdout,
            "  {} {}",
            "         ".dimmed(),
            self.contacts_output.display().to_string().cyan()
        )
        .ok();
    }
}

impl BatchReport {
    pub fn from_entries(directory: &Path, entries: &[BatchEntry]) -> Self {
        let simulations = entries
            .iter()
            .map(|e| {
                TruncationReport::new(
                    &e.trace,
                    &e.contacts,
                    &e.trace_output,
                    &e.contacts_output,
                    e.summary.clone(),
                )
            })
            .collect();
        Self {
            directory: directory.to_path_buf(),
            simulations,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => print_json(self),
            OutputFormat::Yaml => print_yaml(self),
            OutputFormat::Table => {
                let mut stdout = io::stdout();
                writeln!(stdout).ok();
                writeln!(stdout, "{}", "Batch Truncation Results".cyan().bold()).ok();
                writeln!(stdout, "{}", "=".repeat(60)).ok();
                writeln!(
                    stdout,
                    "{} simulation(s) in {}",
                    self.simulations.len(),
                    self.directory.display()
                )
                .ok();
                for report in &self.simulations {
                    report.render_table_rows(&mut stdout);
                }
                stdout.flush().ok();
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| TruncateError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| TruncateError::Serialization(e.to_string()))?;
    println!("{}", yaml);
    Ok(())
}
