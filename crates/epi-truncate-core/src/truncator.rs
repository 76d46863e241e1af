//! Truncation of a trace and its contact document at a cutoff time
//!
//! The truncator runs in two phases. Construction reads both inputs, filters
//! the trace and then filters the contact document against the labels that
//! survived. Afterwards the results are only read, by the two writers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::contacts::ContactDocument;
use crate::error::{Result, TruncateError};
use crate::infective::Label;
use crate::output::write_all_or_nothing;
use crate::settings::TruncateSettings;
use crate::trace::EpidemicTrace;

/// Counts describing one truncation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncationSummary {
    pub cutoff: f64,
    pub records_read: usize,
    pub records_retained: usize,
    /// Retained records whose removal time was clamped to the cutoff
    pub records_censored: usize,
    pub contacts_read: usize,
    pub contacts_removed: usize,
}

impl TruncationSummary {
    pub fn records_dropped(&self) -> usize {
        self.records_read - self.records_retained
    }

    pub fn contacts_retained(&self) -> usize {
        self.contacts_read - self.contacts_removed
    }
}

/// Reject cutoffs that cannot be compared meaningfully with event times.
pub fn validate_cutoff(cutoff: f64) -> Result<()> {
    if cutoff.is_nan() || cutoff.is_infinite() {
        return Err(TruncateError::invalid_argument(format!(
            "cutoff time must be a finite number, got {}",
            cutoff
        )));
    }
    if cutoff < 0.0 {
        return Err(TruncateError::invalid_argument(format!(
            "cutoff time must be non-negative, got {}",
            cutoff
        )));
    }
    Ok(())
}

/// A trace and contact document truncated consistently at one cutoff
#[derive(Debug, Clone)]
pub struct TraceTruncator {
    trace: EpidemicTrace,
    contacts: ContactDocument,
    labels: HashSet<Label>,
    summary: TruncationSummary,
}

impl TraceTruncator {
    /// Truncate files using the default settings.
    pub fn new(trace_path: &Path, contacts_path: &Path, cutoff: f64) -> Result<Self> {
        Self::with_settings(trace_path, contacts_path, cutoff, &TruncateSettings::default())
    }

    /// Read both inputs and truncate them at `cutoff`.
    ///
    /// The cutoff is validated before either file is opened.
    pub fn with_settings(
        trace_path: &Path,
        contacts_path: &Path,
        cutoff: f64,
        settings: &TruncateSettings,
    ) -> Result<Self> {
        validate_cutoff(cutoff)?;

        let trace = EpidemicTrace::load(trace_path)?;
        let contacts = ContactDocument::load(contacts_path, &settings.contacts)?;
        let truncator = Self::from_parts(&trace, contacts, cutoff)?;

        tracing::info!(
            trace = %trace_path.display(),
            contacts = %contacts_path.display(),
            cutoff,
            retained = truncator.summary.records_retained,
            dropped = truncator.summary.records_dropped(),
            contacts_removed = truncator.summary.contacts_removed,
            "Truncated simulation"
        );
        Ok(truncator)
    }

    /// Truncate data that is already in memory.
    pub fn from_parts(trace: &EpidemicTrace, mut contacts: ContactDocument, cutoff: f64) -> Result<Self> {
        validate_cutoff(cutoff)?;

        let truncated = trace.truncate(cutoff);
        let labels = truncated.trace.labels();

        let contacts_read = contacts.len();
        let contacts_removed = contacts.retain_labels(&labels);

        let summary = TruncationSummary {
            cutoff,
            records_read: truncated.records_read,
            records_retained: truncated.trace.len(),
            records_censored: truncated.records_censored,
            contacts_read,
            contacts_removed,
        };

        Ok(Self {
            trace: truncated.trace,
            contacts,
            labels,
            summary,
        })
    }

    pub fn trace(&self) -> &EpidemicTrace {
        &self.trace
    }

    pub fn contacts(&self) -> &ContactDocument {
        &self.contacts
    }

    /// Labels of the retained individuals
    pub fn retained_labels(&self) -> &HashSet<Label> {
        &self.labels
    }

    pub fn summary(&self) -> &TruncationSummary {
        &self.summary
    }

    pub fn write_trace<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.trace.write_to(writer)
    }

    pub fn write_contacts<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.contacts.write_to(writer)
    }

    /// Write both artifacts; either both files appear or neither does.
    pub fn write_outputs(&self, trace_out: &Path, contacts_out: &Path) -> Result<()> {
        let trace_text = self.trace.to_text();
        write_all_or_nothing(&[
            (trace_out, trace_text.as_bytes()),
            (contacts_out, self.contacts.as_str().as_bytes()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ContactSchema;

    const CONTACTS: &str = r#"<tracedcontacts xmlns="tracedcontacts">
  <contact id="1" start="0.5"><from id="2"><type>fm</type><time>0.2</time></from></contact>
  <contact id="2" start="1.0"/>
  <contact id="3" start="1.5"/>
</tracedcontacts>
"#;

    fn parts(trace: &str) -> (EpidemicTrace, ContactDocument) {
        let trace = EpidemicTrace::parse(Path::new("t.ipt"), trace).unwrap();
        let contacts = ContactDocument::parse(
            Path::new("t.contact.xml"),
            CONTACTS.to_string(),
            &ContactSchema::default(),
        )
        .unwrap();
        (trace, contacts)
    }

    #[test]
    fn test_validate_cutoff() {
        assert!(validate_cutoff(0.0).is_ok());
        assert!(validate_cutoff(10.0).is_ok());
        assert!(matches!(
            validate_cutoff(-1.0),
            Err(TruncateError::InvalidArgument(_))
        ));
        assert!(validate_cutoff(f64::NAN).is_err());
        assert!(validate_cutoff(f64::INFINITY).is_err());
    }

    #[test]
    fn test_contacts_follow_retained_labels() {
        let (trace, contacts) = parts("1 0.0 5.0 8.0\n2 1.0 12.0 15.0\n3 2.0 11.0 20.0\n");
        let t = TraceTruncator::from_parts(&trace, contacts, 10.0).unwrap();

        assert_eq!(t.trace().to_text(), "1 0.0 5.0 8.0\n");
        assert_eq!(t.contacts().contact_ids(), vec![1]);
        assert_eq!(t.retained_labels(), &HashSet::from([1]));

        let s = t.summary();
        assert_eq!(s.records_read, 3);
        assert_eq!(s.records_retained, 1);
        assert_eq!(s.records_dropped(), 2);
        assert_eq!(s.contacts_read, 3);
        assert_eq!(s.contacts_removed, 2);
        assert_eq!(s.contacts_retained(), 1);
    }

    #[test]
    fn test_censoring_counted() {
        let (trace, contacts) = parts("3 2.0 4.0 20.0\n");
        let t = TraceTruncator::from_parts(&trace, contacts, 10.0).unwrap();
        assert_eq!(t.trace().to_text(), "3 2.0 4.0 10.0\n");
        assert_eq!(t.summary().records_censored, 1);
    }

    #[test]
    fn test_writers() {
        let (trace, contacts) = parts("1 0.0 5.0 8.0\n3 0.0 1.0 2.0\n");
        let t = TraceTruncator::from_parts(&trace, contacts, 10.0).unwrap();

        let mut out = Vec::new();
        t.write_trace(&mut out).unwrap();
        assert_eq!(out, b"1 0.0 5.0 8.0\n3 0.0 1.0 2.0\n");

        let mut out = Vec::new();
        t.write_contacts(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"<contact id="1""#));
        assert!(!text.contains(r#"<contact id="2""#));
        assert!(text.contains(r#"<contact id="3" start="1.5"/>"#));
    }
}
