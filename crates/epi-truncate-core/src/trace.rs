//! Epidemic traces (`.ipt` files)
//!
//! A trace is a list of [`Infective`] records, one per line. Labels must be
//! unique: a repeated label is a parse error rather than a silent overwrite,
//! because the contact filter works on the label set and would hide the
//! duplicate.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TruncateError};
use crate::infective::{Infective, Label};

/// An epidemic trace held in memory, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpidemicTrace {
    records: Vec<Infective>,
}

/// Result of truncating a trace at a cutoff time
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedTrace {
    pub trace: EpidemicTrace,
    /// Records in the input before truncation
    pub records_read: usize,
    /// Retained records whose removal time was clamped to the cutoff
    pub records_censored: usize,
}

impl EpidemicTrace {
    pub fn new(records: Vec<Infective>) -> Self {
        Self { records }
    }

    /// Read and parse a trace file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TruncateError::io(path, e))?;
        Self::parse(path, &content)
    }

    /// Parse trace text. `source` is only used to label errors.
    pub fn parse(source: &Path, content: &str) -> Result<Self> {
        let mut records = Vec::new();
        let mut seen: HashMap<Label, usize> = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let record = Infective::parse_record(line)
                .map_err(|reason| TruncateError::parse(source, line_no, line, reason))?;

            if let Some(first) = seen.insert(record.label, line_no) {
                return Err(TruncateError::parse(
                    source,
                    line_no,
                    line,
                    format!("duplicate label {} (first seen on line {})", record.label, first),
                ));
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Infective] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> HashSet<Label> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Keep individuals notified by `cutoff`, right-censoring their removal times.
    ///
    /// Input order is preserved.
    pub fn truncate(&self, cutoff: f64) -> TruncatedTrace {
        let mut records_censored = 0;
        let records = self
            .records
            .iter()
            .filter(|r| r.is_notified_by(cutoff))
            .map(|r| {
                let (rec, censored) = r.censored_at(cutoff);
                if censored {
                    records_censored += 1;
                }
                rec
            })
            .collect();

        TruncatedTrace {
            trace: Self { records },
            records_read: self.records.len(),
            records_censored,
        }
    }

    /// Write one `label I N R` line per record.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for record in &self.records {
            writeln!(writer, "{}", record)?;
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        self.records.iter().map(|r| format!("{}\n", r)).collect()
    }
}
