//! Dataset persistence.
//!
//! The authoritative store is a JSON array of entries, one per source key.
//! Reads treat an absent file as an empty dataset; writes always go through a
//! temp-file-then-rename so a crash mid-write can never truncate the store.
//! Output is pretty-printed UTF-8 with non-ASCII text stored literally.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::{RunResult, Segment};

/// The persisted unit of the system: one source recording's label, key, and
/// transcribed segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub label: String,
    pub key: String,
    pub segments: Vec<Segment>,
}

impl From<&RunResult> for DatasetEntry {
    fn from(result: &RunResult) -> Self {
        Self {
            label: result.label.clone(),
            key: result.key.clone(),
            segments: result.segments.clone(),
        }
    }
}

/// Read the dataset file. An absent file is an empty dataset; unreadable or
/// malformed JSON is a persistence failure.
pub fn load(path: &Path) -> Result<Vec<DatasetEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(|e| Error::persistence(path, e))?;
    serde_json::from_str(&raw).map_err(|e| Error::persistence(path, e))
}

/// Replace the dataset file with the given entries, atomically.
pub fn save(path: &Path, entries: &[DatasetEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries).map_err(|e| Error::persistence(path, e))?;
    write_atomic(path, json.as_bytes())
}

/// Write a file via temp-file-then-rename in the destination directory.
///
/// The temp file lives next to the destination so the final rename stays on one
/// filesystem and is atomic.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| Error::persistence(path, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| Error::persistence(path, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.write_all(b"\n"))
        .map_err(|e| Error::persistence(path, e))?;

    tmp.persist(path).map_err(|e| Error::persistence(path, e.error))?;
    Ok(())
}
