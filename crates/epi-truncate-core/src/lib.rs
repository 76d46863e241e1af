//! Epidemic Trace Truncation
//!
//! Truncates a simulated epidemic at a cutoff time, keeping the epidemic
//! trace and its contact-tracing document consistent with each other.
//!
//! ## Features
//!
//! - **Trace filtering**: keep individuals notified by the cutoff and
//!   right-censor their removal times
//! - **Referential integrity**: drop every contact element whose `id` is not
//!   a retained label
//! - **Verbatim output**: retained parts of the contact document are copied
//!   byte for byte
//! - **All-or-nothing writes**: both output files appear, or neither does
//! - **Batch mode**: truncate every simulation in a directory
//!
//! ## Example
//!
//! ```rust,no_run
//! use epi_truncate_core::TraceTruncator;
//! use std::path::Path;
//!
//! let truncator = TraceTruncator::new(
//!     Path::new("sim01.ipt"),
//!     Path::new("sim01.contact.xml"),
//!     10.0,
//! )?;
//! truncator.write_outputs(
//!     Path::new("sim01.trunc.ipt"),
//!     Path::new("sim01.trunc.contact.xml"),
//! )?;
//! println!("kept {} individuals", truncator.summary().records_retained);
//! # Ok::<(), epi_truncate_core::TruncateError>(())
//! ```

pub mod batch;
pub mod contacts;
pub mod error;
pub mod infective;
pub mod output;
pub mod settings;
pub mod trace;
pub mod truncator;

pub use batch::{batch_truncate, BatchEntry};
pub use contacts::ContactDocument;
pub use error::{Result, TruncateError};
pub use infective::{Infective, Label};
pub use settings::{ContactSchema, FileNaming, TruncateSettings};
pub use trace::{EpidemicTrace, TruncatedTrace};
pub use truncator::{validate_cutoff, TraceTruncator, TruncationSummary};
