//! Truncation settings
//!
//! Defaults match the files written by the simulator. A TOML file can
//! override any subset of them:
//!
//! ```toml
//! batch_fraction = 0.5
//!
//! [contacts]
//! namespace = "tracedcontacts"
//! element = "contact"
//! id_attribute = "id"
//!
//! [naming]
//! trace_extension = ".ipt"
//! contacts_extension = ".contact.xml"
//! truncated_marker = ".trunc"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TruncateError};

/// Where contact elements live in the contact-tracing document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSchema {
    /// Namespace URI of contact elements; empty means no namespace
    pub namespace: String,
    /// Local name of contact elements
    pub element: String,
    /// Unqualified attribute carrying the individual's label
    pub id_attribute: String,
}

impl Default for ContactSchema {
    fn default() -> Self {
        Self {
            namespace: "tracedcontacts".to_string(),
            element: "contact".to_string(),
            id_attribute: "id".to_string(),
        }
    }
}

/// File naming conventions for simulation outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNaming {
    pub trace_extension: String,
    pub contacts_extension: String,
    /// Inserted before the extension of truncated outputs
    pub truncated_marker: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            trace_extension: ".ipt".to_string(),
            contacts_extension: ".contact.xml".to_string(),
            truncated_marker: ".trunc".to_string(),
        }
    }
}

impl FileNaming {
    /// `prefix` + trace extension
    pub fn trace_path(&self, prefix: &Path) -> PathBuf {
        append(prefix, &self.trace_extension)
    }

    /// `prefix` + contacts extension
    pub fn contacts_path(&self, prefix: &Path) -> PathBuf {
        append(prefix, &self.contacts_extension)
    }

    /// Prefix of a trace file name, if it carries the trace extension
    pub fn trace_prefix(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(self.trace_extension.as_str())?;
        if stem.is_empty() {
            return None;
        }
        Some(path.with_file_name(stem))
    }

    /// Whether a trace file is itself a truncation output
    pub fn is_truncated_trace(&self, path: &Path) -> bool {
        self.trace_prefix(path)
            .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_owned))
            .map_or(false, |stem| stem.ends_with(self.truncated_marker.as_str()))
    }

    /// Default output path for a truncated file.
    ///
    /// `x.ipt` becomes `x.trunc.ipt` and `x.contact.xml` becomes
    /// `x.trunc.contact.xml`; other names get the marker before their last
    /// extension, or appended when they have none.
    pub fn truncated_path(&self, input: &Path) -> PathBuf {
        let marker = self.truncated_marker.as_str();
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for ext in [&self.contacts_extension, &self.trace_extension] {
            if let Some(stem) = name.strip_suffix(ext.as_str()) {
                if !stem.is_empty() {
                    return input.with_file_name(format!("{stem}{marker}{ext}"));
                }
            }
        }

        match name.rfind('.') {
            Some(dot) if dot > 0 => {
                let (stem, ext) = name.split_at(dot);
                input.with_file_name(format!("{stem}{marker}{ext}"))
            }
            _ => input.with_file_name(format!("{name}{marker}")),
        }
    }
}

fn append(prefix: &Path, suffix: &str) -> PathBuf {
    let mut os = prefix.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Complete settings for a truncation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncateSettings {
    pub contacts: ContactSchema,
    pub naming: FileNaming,
    /// Batch cutoff as a fraction of the last record's removal time
    pub batch_fraction: f64,
}

impl Default for TruncateSettings {
    fn default() -> Self {
        Self {
            contacts: ContactSchema::default(),
            naming: FileNaming::default(),
            batch_fraction: 0.5,
        }
    }
}

impl TruncateSettings {
    /// Load settings from a TOML file, falling back to defaults for absent keys
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TruncateError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.batch_fraction.is_finite() && self.batch_fraction > 0.0) {
            return Err(TruncateError::invalid_argument(format!(
                "batch fraction must be a positive number, got {}",
                self.batch_fraction
            )));
        }
        if self.contacts.element.is_empty() || self.contacts.id_attribute.is_empty() {
            return Err(TruncateError::Config(
                "contact element and id attribute names must not be empty".to_string(),
            ));
        }
        let naming = &self.naming;
        if naming.trace_extension.is_empty()
            || naming.contacts_extension.is_empty()
            || naming.truncated_marker.is_empty()
        {
            return Err(TruncateError::Config(
                "file extensions and the truncated marker must not be empty".to_string(),
            ));
        }
        if naming.trace_extension == naming.contacts_extension {
            return Err(TruncateError::Config(
                "trace and contacts extensions must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = TruncateSettings::default();
        assert_eq!(settings.contacts.namespace, "tracedcontacts");
        assert_eq!(settings.contacts.element, "contact");
        assert_eq!(settings.batch_fraction, 0.5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = TruncateSettings::from_toml_str(
            r#"
            batch_fraction = 0.25

            [contacts]
            namespace = ""
            "#,
        )
        .unwrap();
        assert_eq!(settings.batch_fraction, 0.25);
        assert_eq!(settings.contacts.namespace, "");
        assert_eq!(settings.contacts.element, "contact");
        assert_eq!(settings.naming, FileNaming::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = TruncateSettings::from_toml_str("batch_fraction = \"half\"").unwrap_err();
        assert!(matches!(err, TruncateError::Config(_)));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let err = TruncateSettings::from_toml_str("[naming]\ntruncated_marker = \"\"\n").unwrap_err();
        assert!(matches!(err, TruncateError::Config(_)));
    }

    #[test]
    fn test_invalid_fraction() {
        let err = TruncateSettings::from_toml_str("batch_fraction = -1.0").unwrap_err();
        assert!(matches!(err, TruncateError::InvalidArgument(_)));
    }

    #[test]
    fn test_prefix_paths() {
        let naming = FileNaming::default();
        let prefix = Path::new("runs/sim01");
        assert_eq!(naming.trace_path(prefix), PathBuf::from("runs/sim01.ipt"));
        assert_eq!(
            naming.contacts_path(prefix),
            PathBuf::from("runs/sim01.contact.xml")
        );
        assert_eq!(
            naming.trace_prefix(Path::new("runs/sim01.ipt")),
            Some(PathBuf::from("runs/sim01"))
        );
        assert_eq!(naming.trace_prefix(Path::new("runs/sim01.txt")), None);
        assert_eq!(naming.trace_prefix(Path::new(".ipt")), None);
    }

    #[test]
    fn test_truncated_detection() {
        let naming = FileNaming::default();
        assert!(naming.is_truncated_trace(Path::new("a/sim.trunc.ipt")));
        assert!(!naming.is_truncated_trace(Path::new("a/sim.ipt")));
        assert!(!naming.is_truncated_trace(Path::new("a/sim.contact.xml")));
    }

    #[test]
    fn test_truncated_path() {
        let naming = FileNaming::default();
        assert_eq!(
            naming.truncated_path(Path::new("d/sim.ipt")),
            PathBuf::from("d/sim.trunc.ipt")
        );
        assert_eq!(
            naming.truncated_path(Path::new("d/sim.contact.xml")),
            PathBuf::from("d/sim.trunc.contact.xml")
        );
        assert_eq!(
            naming.truncated_path(Path::new("d/contacts.xml")),
            PathBuf::from("d/contacts.trunc.xml")
        );
        assert_eq!(
            naming.truncated_path(Path::new("d/trace")),
            PathBuf::from("d/trace.trunc")
        );
    }
}
