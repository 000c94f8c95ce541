//! The run orchestrator.
//!
//! `Pipeline` wires the pieces together for a whole run: for each configured
//! source (in order) it decodes the file, segments it, extracts and optionally
//! persists each clip, transcribes it, and assembles a [`RunResult`].
//!
//! Failure policy:
//! - a missing source file is skipped with a warning and produces no result
//! - a file that exists but fails to decode aborts the run
//! - a failed transcription aborts the run
//!
//! Aborting means no partial `RunResult` ever reaches the merge step, so a
//! half-transcribed source can never overwrite a complete dataset entry.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clip::{self, ClipPolicy};
use crate::config::SourceSpec;
use crate::decoder::decode_file;
use crate::error::Result;
use crate::records::{RunResult, Segment};
use crate::segmenter::{self, SilencePolicy};
use crate::transcriber::Transcriber;

/// Drives decode → segment → extract → transcribe for a list of sources.
///
/// The transcriber is injected by reference so one service client (and its
/// connection pool) serves the whole run.
pub struct Pipeline<'a, T: Transcriber> {
    transcriber: &'a T,
    silence: SilencePolicy,
    clip: ClipPolicy,
    clips_dir: Option<PathBuf>,
}

impl<'a, T: Transcriber> Pipeline<'a, T> {
    /// Create a pipeline with default policies and no clip persistence.
    pub fn new(transcriber: &'a T) -> Self {
        Self {
            transcriber,
            silence: SilencePolicy::default(),
            clip: ClipPolicy::default(),
            clips_dir: None,
        }
    }

    pub fn with_silence_policy(mut self, policy: SilencePolicy) -> Self {
        self.silence = policy;
        self
    }

    pub fn with_clip_policy(mut self, policy: ClipPolicy) -> Self {
        self.clip = policy;
        self
    }

    /// Persist extracted clips under `dir` (`{dir}/{key}/{NN}.flac`).
    pub fn with_clips_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.clips_dir = Some(dir.into());
        self
    }

    /// Process every source in configured order.
    ///
    /// Returns one `RunResult` per source whose file existed, in source order.
    /// The first decode or service failure aborts the whole run.
    pub fn run(&self, sources: &[SourceSpec]) -> Result<Vec<RunResult>> {
        let mut results = Vec::new();
        for spec in sources {
            if let Some(result) = self.process_source(spec)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    fn process_source(&self, spec: &SourceSpec) -> Result<Option<RunResult>> {
        if !spec.file.exists() {
            warn!(
                file = %spec.file.display(),
                key = %spec.key,
                "source file not found, skipping"
            );
            return Ok(None);
        }

        info!(key = %spec.key, label = %spec.label, "processing source");

        let waveform = decode_file(&spec.file)?;
        let intervals = segmenter::segment(&waveform, self.silence);
        info!(key = %spec.key, segments = intervals.len(), "segmentation complete");

        let mut segments = Vec::with_capacity(intervals.len());
        for (index, interval) in intervals.iter().enumerate() {
            let bytes = clip::extract(&waveform, *interval, self.clip)?;

            if let Some(dir) = &self.clips_dir {
                let path = clip::write_clip(dir, &spec.key, index, &bytes)?;
                info!(clip = %path.display(), "wrote clip file");
            }

            let transcript = self.transcriber.transcribe(&bytes)?;
            info!(
                key = %spec.key,
                clip = index + 1,
                total = intervals.len(),
                %transcript,
                "transcribed clip"
            );
            segments.push(Segment { transcript });
        }

        Ok(Some(RunResult {
            label: spec.label.clone(),
            key: spec.key.clone(),
            segments,
        }))
    }
}
