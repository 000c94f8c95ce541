//! Run configuration.
//!
//! A run is described by a TOML file: the source list (file/key/label triples)
//! plus optional tables overriding segmentation, clip, transcription, and output
//! settings. Everything except the sources has defaults matching the pipeline's
//! documented behavior, so a minimal config is just `[[sources]]` entries.
//!
//! The API credential is deliberately NOT part of this file; it comes from the
//! process environment so configs can be committed alongside the audio.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::clip::{ClipPolicy, DEFAULT_CLIP_POLICY};
use crate::error::{Error, Result};
use crate::segmenter::{DEFAULT_SILENCE_POLICY, SilencePolicy};
use crate::whisper_api::{DEFAULT_LANGUAGE, DEFAULT_MODEL};

/// One source recording: where it lives, its stable dataset key, and its
/// human-readable label.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub file: PathBuf,
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    pub min_silence_ms: u64,
    pub silence_threshold_db: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: DEFAULT_SILENCE_POLICY.min_silence_ms,
            silence_threshold_db: DEFAULT_SILENCE_POLICY.threshold_db,
        }
    }
}

impl SegmentationConfig {
    pub fn policy(&self) -> SilencePolicy {
        SilencePolicy {
            min_silence_ms: self.min_silence_ms,
            threshold_db: self.silence_threshold_db,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipConfig {
    pub lead_pad_ms: u64,
    pub trail_pad_ms: u64,

    /// Where clip files are written. `None` disables clip persistence.
    pub dir: Option<PathBuf>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            lead_pad_ms: DEFAULT_CLIP_POLICY.lead_pad_ms,
            trail_pad_ms: DEFAULT_CLIP_POLICY.trail_pad_ms,
            dir: None,
        }
    }
}

impl ClipConfig {
    pub fn policy(&self) -> ClipPolicy {
        ClipPolicy {
            lead_pad_ms: self.lead_pad_ms,
            trail_pad_ms: self.trail_pad_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscriptionConfig {
    pub model: String,
    pub language: String,
    pub prompt: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            prompt: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// The authoritative dataset file.
    pub dataset: PathBuf,

    /// The transcript backup file written after each run.
    pub backup: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data.json"),
            backup: PathBuf::from("transcripts.json"),
        }
    }
}

/// Everything a run needs, minus the credential.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    #[serde(default)]
    pub segmentation: SegmentationConfig,

    #[serde(default)]
    pub clips: ClipConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// Load and validate a TOML run configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    /// Parse and validate TOML configuration text.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Keys are the dataset's identity, so they must be present and unique.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(Error::config(format!(
                    "source '{}' has an empty key",
                    source.file.display()
                )));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(Error::config(format!(
                    "duplicate source key '{}'",
                    source.key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [[sources]]
        file = "audio/business-adjectives.mp3"
        key = "adj"
        label = "ビジネス 形容詞"

        [[sources]]
        file = "audio/business-future.m4a"
        key = "future"
        label = "未来 ビジネスシーン"

        [segmentation]
        min_silence_ms = 450
        silence_threshold_db = -35.0

        [clips]
        lead_pad_ms = 150
        trail_pad_ms = 250
        dir = "audio/segments"

        [transcription]
        model = "whisper-1"
        language = "en"
        prompt = "Business English sentences."

        [output]
        dataset = "data.json"
        backup = "transcripts.json"
    "#;

    #[test]
    fn full_config_parses() -> crate::Result<()> {
        let config = RunConfig::parse(FULL)?;

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].key, "adj");
        assert_eq!(config.sources[1].label, "未来 ビジネスシーン");
        assert_eq!(config.segmentation.min_silence_ms, 450);
        assert_eq!(config.clips.dir.as_deref(), Some(Path::new("audio/segments")));
        assert_eq!(
            config.transcription.prompt.as_deref(),
            Some("Business English sentences.")
        );
        Ok(())
    }

    #[test]
    fn minimal_config_gets_documented_defaults() -> crate::Result<()> {
        let config = RunConfig::parse(
            r#"
            [[sources]]
            file = "a.mp3"
            key = "a"
            label = "A"
            "#,
        )?;

        assert_eq!(config.segmentation.min_silence_ms, 600);
        assert_eq!(config.segmentation.silence_threshold_db, -40.0);
        assert_eq!(config.clips.lead_pad_ms, 200);
        assert_eq!(config.clips.trail_pad_ms, 300);
        assert!(config.clips.dir.is_none());
        assert_eq!(config.transcription.model, "whisper-1");
        assert_eq!(config.transcription.language, "en");
        assert_eq!(config.output.dataset, PathBuf::from("data.json"));
        assert_eq!(config.output.backup, PathBuf::from("transcripts.json"));
        Ok(())
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = RunConfig::parse(
            r#"
            [[sources]]
            file = "a.mp3"
            key = "adj"
            label = "A"

            [[sources]]
            file = "b.mp3"
            key = "adj"
            label = "B"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("duplicate source key 'adj'"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = RunConfig::parse(
            r#"
            [[sources]]
            file = "a.mp3"
            key = "  "
            label = "A"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("empty key"));
    }
}
