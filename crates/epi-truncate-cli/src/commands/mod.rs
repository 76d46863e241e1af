//! CLI command definitions
//!
//! Clap-based definitions for truncating a single simulation, a simulation
//! addressed by file prefix, or a whole directory of simulations.

mod execute;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::report::OutputFormat;
use crate::ExitCode;
use epi_truncate_core::{Result, TruncateSettings};

pub use execute::{execute_batch, execute_prefix, execute_run};

/// Epidemic simulation truncation
///
/// Truncates an epidemic trace and its contact-tracing document at a cutoff
/// time, keeping the two consistent.
#[derive(Parser, Debug)]
#[command(name = "truncate-sim")]
#[command(about = "Truncate simulated epidemics with contact tracing at a cutoff time", long_about = None)]
#[command(version)]
pub struct TruncateCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "EPI_TRUNCATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for the summary
    #[arg(long, value_enum, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: TruncateCommands,
}

/// Available truncation commands
#[derive(Subcommand, Debug)]
pub enum TruncateCommands {
    /// Truncate a trace and its contact document
    ///
    /// Outputs default to the input names with `.trunc` inserted, e.g.
    /// `sim.ipt` -> `sim.trunc.ipt`.
    Run {
        /// Epidemic trace (`label I N R` per line)
        trace: PathBuf,

        /// Contact-tracing XML document
        contacts: PathBuf,

        /// Cutoff time
        #[arg(allow_negative_numbers = true)]
        cutoff: f64,

        /// Where to write the truncated trace
        #[arg(long)]
        output_trace: Option<PathBuf>,

        /// Where to write the truncated contact document
        #[arg(long)]
        output_contacts: Option<PathBuf>,
    },

    /// Truncate `<input>.ipt` and `<input>.contact.xml` into `<output>.*`
    Prefix {
        /// Input simulation prefix
        input: PathBuf,

        /// Cutoff time
        #[arg(allow_negative_numbers = true)]
        cutoff: f64,

        /// Output simulation prefix
        output: PathBuf,
    },

    /// Truncate every simulation in a directory
    ///
    /// Each `<prefix>.ipt` is cut at a fraction of its last record's removal
    /// time and written to `<prefix>.trunc.ipt` / `<prefix>.trunc.contact.xml`.
    Batch {
        /// Directory holding `.ipt` / `.contact.xml` pairs
        dir: PathBuf,

        /// Fraction of the last removal time used as cutoff [default: 0.5]
        #[arg(long)]
        fraction: Option<f64>,
    },
}

impl TruncateCli {
    /// Log level implied by `-q` / `-v` flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Settings from `--config`, or defaults
    pub fn settings(&self) -> Result<TruncateSettings> {
        match &self.config {
            Some(path) => TruncateSettings::from_file(path),
            None => Ok(TruncateSettings::default()),
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: TruncateCli) -> Result<ExitCode> {
    let format = if cli.quiet { None } else { Some(cli.format) };

    match &cli.command {
        TruncateCommands::Run {
            trace,
            contacts,
            cutoff,
            output_trace,
            output_contacts,
        } => execute_run(
            &cli,
            trace,
            contacts,
            *cutoff,
            output_trace.as_deref(),
            output_contacts.as_deref(),
            format,
        ),
        TruncateCommands::Prefix {
            input,
            cutoff,
            output,
        } => execute_prefix(&cli, input, *cutoff, output, format),
        TruncateCommands::Batch { dir, fraction } => execute_batch(&cli, dir, *fraction, format),
    }
}
