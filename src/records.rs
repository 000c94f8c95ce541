//! Per-run records and the transcript backup artifact.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::write_atomic;
use crate::error::{Error, Result};

/// One transcribed clip. The transcript may be empty when the service returns
/// empty text; it is never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub transcript: String,
}

/// The in-memory outcome of processing one source recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub label: String,
    pub key: String,
    pub segments: Vec<Segment>,
}

/// Backup shape: transcripts flattened to plain strings. This is a debug
/// artifact, not the authoritative dataset.
#[derive(Serialize)]
struct BackupEntry<'a> {
    label: &'a str,
    key: &'a str,
    transcripts: Vec<&'a str>,
}

/// Write the transcript backup file for a completed run.
pub fn write_backup(path: &Path, results: &[RunResult]) -> Result<()> {
    let entries: Vec<BackupEntry<'_>> = results
        .iter()
        .map(|r| BackupEntry {
            label: &r.label,
            key: &r.key,
            transcripts: r.segments.iter().map(|s| s.transcript.as_str()).collect(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries).map_err(|e| Error::persistence(path, e))?;
    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_flattens_segments_to_transcripts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("transcripts.json");

        let results = vec![RunResult {
            label: "未来 ビジネスシーン".to_string(),
            key: "future".to_string(),
            segments: vec![
                Segment {
                    transcript: "I will lead the project.".to_string(),
                },
                Segment {
                    transcript: String::new(),
                },
            ],
        }];
        write_backup(&path, &results)?;

        let raw = std::fs::read_to_string(&path)?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(parsed[0]["key"], "future");
        assert_eq!(parsed[0]["transcripts"][0], "I will lead the project.");
        assert_eq!(parsed[0]["transcripts"][1], "");
        assert!(raw.contains("未来 ビジネスシーン"));
        Ok(())
    }

    #[test]
    fn empty_run_writes_an_empty_array() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("transcripts.json");

        write_backup(&path, &[])?;
        assert_eq!(std::fs::read_to_string(&path)?.trim(), "[]");
        Ok(())
    }
}
