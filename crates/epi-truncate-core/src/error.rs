//! Error types for epidemic truncation
//!
//! Every failure aborts the whole truncation; nothing is retried or recovered.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for truncation operations
#[derive(Error, Debug)]
pub enum TruncateError {
    /// Invalid argument, rejected before any file is touched
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File access or I/O error
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed record in an epidemic trace
    #[error("Parse error in '{}' line {line}: {reason} (content: {content:?})", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
        reason: String,
    },

    /// Malformed contact-tracing document
    #[error("Structural error in '{}': {reason}", path.display())]
    Structure { path: PathBuf, reason: String },

    /// Settings file could not be read or decoded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error while rendering results
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TruncateError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        TruncateError::InvalidArgument(msg.into())
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        TruncateError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a parse error for a trace line
    pub fn parse(
        path: impl AsRef<Path>,
        line: usize,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TruncateError::Parse {
            path: path.as_ref().to_path_buf(),
            line,
            content: content.into(),
            reason: reason.into(),
        }
    }

    /// Create a structural error for a contact document
    pub fn structure(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        TruncateError::Structure {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TruncateError::InvalidArgument(_)
                | TruncateError::Io { .. }
                | TruncateError::Parse { .. }
                | TruncateError::Structure { .. }
                | TruncateError::Config(_)
        )
    }
}

impl From<toml::de::Error> for TruncateError {
    fn from(err: toml::de::Error) -> Self {
        TruncateError::Config(format!("TOML error: {}", err))
    }
}

/// Result type alias for truncation operations
pub type Result<T> = std::result::Result<T, TruncateError>;
