//! All-or-nothing output writing
//!
//! Each artifact is written to a temporary file next to its destination and
//! only renamed into place once every artifact has been written completely.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, TruncateError};

/// Write every `(path, contents)` pair, or none of them.
pub fn write_all_or_nothing(outputs: &[(&Path, &[u8])]) -> Result<()> {
    for (i, (path, _)) in outputs.iter().enumerate() {
        if outputs[..i].iter().any(|(other, _)| other == path) {
            return Err(TruncateError::invalid_argument(format!(
                "output path '{}' given more than once",
                path.display()
            )));
        }
    }

    let mut staged = Vec::with_capacity(outputs.len());
    for (path, contents) in outputs {
        staged.push((*path, stage(path, contents)?));
    }

    let mut persisted: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (path, tmp) in staged {
        if let Err(e) = tmp.persist(path) {
            for done in &persisted {
                if let Err(err) = std::fs::remove_file(done) {
                    tracing::warn!(
                        path = %done.display(),
                        error = %err,
                        "Failed to roll back output after a later write failed"
                    );
                }
            }
            return Err(TruncateError::io(path, e.error));
        }
        tracing::debug!(path = %path.display(), "Wrote output");
        persisted.push(path.to_path_buf());
    }
    Ok(())
}

fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TruncateError::io(path, e))?;
    tmp.write_all(contents).map_err(|e| TruncateError::io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| TruncateError::io(path, e))?;
    Ok(tmp)
}
