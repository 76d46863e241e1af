//! Command-line interface for epidemic truncation
//!
//! ## CLI Usage
//!
//! ```bash
//! # Truncate a trace and its contact document at t = 10
//! truncate-sim run sim01.ipt sim01.contact.xml 10.0
//!
//! # Same, using the simulator's file prefixes
//! truncate-sim prefix runs/sim01 10.0 runs/sim01-t10
//!
//! # Truncate every simulation in a directory at half its duration
//! truncate-sim batch runs/
//! ```

pub mod commands;
pub mod report;

pub use commands::{TruncateCli, TruncateCommands};
pub use report::{OutputFormat, TruncationReport};

use epi_truncate_core::TruncateError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Both outputs written
    Success = 0,
    /// Invalid argument or configuration
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Malformed epidemic trace
    ParseError = 5,
    /// Malformed contact document
    StructureError = 6,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a failed run
    pub fn from_error(err: &TruncateError) -> Self {
        match err {
            TruncateError::InvalidArgument(_) | TruncateError::Config(_) => ExitCode::InvalidInput,
            TruncateError::Io { .. } => ExitCode::FileError,
            TruncateError::Parse { .. } => ExitCode::ParseError,
            TruncateError::Structure { .. } => ExitCode::StructureError,
            TruncateError::Serialization(_) => ExitCode::InternalError,
        }
    }
}

/// Run the CLI application
///
/// This is the main entry point for the `truncate-sim` binary.
pub fn run_cli(cli: TruncateCli) -> ExitCode {
    match commands::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
