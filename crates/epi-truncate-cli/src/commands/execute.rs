use std::path::Path;

use epi_truncate_core::{batch_truncate, validate_cutoff, Result, TraceTruncator};

use super::TruncateCli;
use crate::report::{BatchReport, OutputFormat, TruncationReport};
use crate::ExitCode;

/// Execute the run command
pub fn execute_run(
    cli: &TruncateCli,
    trace: &Path,
    contacts: &Path,
    cutoff: f64,
    output_trace: Option<&Path>,
    output_contacts: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    // The settings file is I/O too; a bad cutoff must fail before it.
    validate_cutoff(cutoff)?;
    let settings = cli.settings()?;

    let trace_output = output_trace
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.naming.truncated_path(trace));
    let contacts_output = output_contacts
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.naming.truncated_path(contacts));

    let truncator = TraceTruncator::with_settings(trace, contacts, cutoff, &settings)?;
    truncator.write_outputs(&trace_output, &contacts_output)?;

    if let Some(format) = format {
        TruncationReport::new(
            trace,
            contacts,
            &trace_output,
            &contacts_output,
            truncator.summary().clone(),
        )
        .render(format)?;
    }
    Ok(ExitCode::Success)
}

/// Execute the prefix command
pub fn execute_prefix(
    cli: &TruncateCli,
    input: &Path,
    cutoff: f64,
    output: &Path,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    validate_cutoff(cutoff)?;
    let settings = cli.settings()?;
    let naming = &settings.naming;

    let trace = naming.trace_path(input);
    let contacts = naming.contacts_path(input);
    let trace_output = naming.trace_path(output);
    let contacts_output = naming.contacts_path(output);

    let truncator = TraceTruncator::with_settings(&trace, &contacts, cutoff, &settings)?;
    truncator.write_outputs(&trace_output, &contacts_output)?;

    if let Some(format) = format {
        TruncationReport::new(
            &trace,
            &contacts,
            &trace_output,
            &contacts_output,
            truncator.summary().clone(),
        )
        .render(format)?;
    }
    Ok(ExitCode::Success)
}

/// Execute the batch command
pub fn execute_batch(
    cli: &TruncateCli,
    dir: &Path,
    fraction: Option<f64>,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let mut settings = cli.settings()?;
    if let Some(fraction) = fraction {
        settings.batch_fraction = fraction;
    }

    let entries = batch_truncate(dir, &settings)?;

    if let Some(format) = format {
        BatchReport::from_entries(dir, &entries).render(format)?;
    }
    Ok(ExitCode::Success)
}
