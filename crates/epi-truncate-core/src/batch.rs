//! Truncation of every simulation in a directory
//!
//! Each `<prefix>.ipt` is truncated at a fixed fraction of its last record's
//! removal time, writing `<prefix>.trunc.ipt` and `<prefix>.trunc.contact.xml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::contacts::ContactDocument;
use crate::error::{Result, TruncateError};
use crate::settings::TruncateSettings;
use crate::trace::EpidemicTrace;
use crate::truncator::{validate_cutoff, TraceTruncator, TruncationSummary};

/// Outcome for one simulation of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub trace: PathBuf,
    pub contacts: PathBuf,
    pub trace_output: PathBuf,
    pub contacts_output: PathBuf,
    pub summary: TruncationSummary,
}

/// Cutoff for a batch member: `fraction` of the last record's removal time.
pub fn batch_cutoff(trace: &EpidemicTrace, fraction: f64) -> Option<f64> {
    trace.records().last().map(|r| r.removal_time * fraction)
}

/// Trace files in `dir` eligible for batch truncation, in name order.
pub fn batch_inputs(dir: &Path, settings: &TruncateSettings) -> Result<Vec<PathBuf>> {
    let naming = &settings.naming;
    let mut inputs = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(|e| TruncateError::io(dir, e))? {
        let entry = entry.map_err(|e| TruncateError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || naming.trace_prefix(&path).is_none() {
            continue;
        }
        if naming.is_truncated_trace(&path) {
            tracing::debug!(path = %path.display(), "Skipping truncated output");
            continue;
        }
        inputs.push(path);
    }

    inputs.sort();
    Ok(inputs)
}

/// Truncate one simulation given the path of its trace file.
pub fn truncate_member(trace_path: &Path, settings: &TruncateSettings) -> Result<BatchEntry> {
    let naming = &settings.naming;
    let prefix = naming.trace_prefix(trace_path).ok_or_else(|| {
        TruncateError::invalid_argument(format!(
            "'{}' does not end with '{}'",
            trace_path.display(),
            naming.trace_extension
        ))
    })?;

    let trace = EpidemicTrace::load(trace_path)?;
    let cutoff = batch_cutoff(&trace, settings.batch_fraction).ok_or_else(|| {
        TruncateError::parse(trace_path, 0, "", "trace has no records to derive a cutoff from")
    })?;
    validate_cutoff(cutoff)?;

    let contacts_path = naming.contacts_path(&prefix);
    let contacts = ContactDocument::load(&contacts_path, &settings.contacts)?;
    let truncator = TraceTruncator::from_parts(&trace, contacts, cutoff)?;

    let trace_output = naming.truncated_path(trace_path);
    let contacts_output = naming.truncated_path(&contacts_path);
    truncator.write_outputs(&trace_output, &contacts_output)?;

    tracing::info!(
        trace = %trace_path.display(),
        cutoff,
        retained = truncator.summary().records_retained,
        "Truncated batch member"
    );

    Ok(BatchEntry {
        trace: trace_path.to_path_buf(),
        contacts: contacts_path,
        trace_output,
        contacts_output,
        summary: truncator.summary().clone(),
    })
}

/// Truncate every simulation in `dir`. Stops at the first failure.
pub fn batch_truncate(dir: &Path, settings: &TruncateSettings) -> Result<Vec<BatchEntry>> {
    settings.validate()?;
    let inputs = batch_inputs(dir, settings)?;
    if inputs.is_empty() {
        tracing::warn!(dir = %dir.display(), "No trace files found");
    }
    inputs
        .iter()
        .map(|path| truncate_member(path, settings))
        .collect()
}
