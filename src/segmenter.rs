//! Silence-based segmentation.
//!
//! Current behavior:
//! - Compute an RMS amplitude envelope over fixed 10ms frames, in dBFS.
//! - Classify maximal sub-threshold runs of at least `min_silence_ms` as silence.
//! - Emit the complement as `Interval`s: every maximal span between silences,
//!   including leading/trailing speech.
//!
//! Why this design:
//! - Quiet gaps shorter than `min_silence_ms` stay inside their surrounding
//!   interval, so natural pauses do not shred a sentence into fragments.
//! - A fully silent recording yields zero intervals rather than one empty one.

use crate::waveform::Waveform;

/// Envelope resolution. Segment boundaries are quantized to this frame size.
const ENVELOPE_FRAME_MS: u64 = 10;

/// A contiguous non-silent time span in a source recording.
///
/// Invariants (upheld by [`segment`]): `start_ms < end_ms`, both within
/// `[0, waveform duration]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Interval {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Policy knobs for silence classification.
///
/// Values are expressed in human-friendly units (ms, dB) and converted to frame
/// counts internally.
#[derive(Debug, Clone, Copy)]
pub struct SilencePolicy {
    /// Minimum duration of a sub-threshold gap to be considered silence.
    pub min_silence_ms: u64,

    /// Amplitude threshold (dBFS, full scale = 1.0) at or below which a frame
    /// is considered silent.
    pub threshold_db: f32,
}

/// Default policy tuned for dictation-style recordings with deliberate pauses.
pub const DEFAULT_SILENCE_POLICY: SilencePolicy = SilencePolicy {
    min_silence_ms: 600,
    threshold_db: -40.0,
};

impl Default for SilencePolicy {
    fn default() -> Self {
        DEFAULT_SILENCE_POLICY
    }
}

/// Split a waveform into its ordered non-silent intervals.
///
/// Guarantees:
/// - intervals are non-overlapping and strictly increasing in `start_ms`
/// - every interval has positive duration
/// - an all-silent (or empty) waveform yields an empty vec
pub fn segment(waveform: &Waveform, policy: SilencePolicy) -> Vec<Interval> {
    let duration_ms = waveform.duration_ms();
    if duration_ms == 0 {
        return Vec::new();
    }

    let frame_len = (waveform.sample_rate() as u64 * ENVELOPE_FRAME_MS / 1000) as usize;
    let silent: Vec<bool> = waveform
        .samples()
        .chunks(frame_len)
        .map(|frame| rms_dbfs(frame) <= policy.threshold_db)
        .collect();

    let min_silence_frames = policy.min_silence_ms.div_ceil(ENVELOPE_FRAME_MS) as usize;
    let silences = silent_runs(&silent, min_silence_frames.max(1));

    complement_intervals(&silences, duration_ms)
}

/// RMS level of one frame in dBFS. An empty or all-zero frame is -inf (silent
/// under any finite threshold).
fn rms_dbfs(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return f32::NEG_INFINITY;
    }

    let mean_sq = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    let rms = mean_sq.sqrt();
    if rms <= 0.0 {
        return f32::NEG_INFINITY;
    }

    20.0 * rms.log10()
}

/// Maximal runs of consecutive silent frames with at least `min_frames` frames,
/// as `(start_frame, end_frame)` half-open pairs.
fn silent_runs(silent: &[bool], min_frames: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &is_silent) in silent.iter().enumerate() {
        match (is_silent, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if i - start >= min_frames {
                    runs.push((start, i));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if silent.len() - start >= min_frames {
            runs.push((start, silent.len()));
        }
    }

    runs
}

/// Invert silence runs into non-silent intervals over `[0, duration_ms]`.
fn complement_intervals(silences: &[(usize, usize)], duration_ms: u64) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut cursor_ms = 0u64;

    for &(start_frame, end_frame) in silences {
        let silence_start_ms = (start_frame as u64 * ENVELOPE_FRAME_MS).min(duration_ms);
        let silence_end_ms = (end_frame as u64 * ENVELOPE_FRAME_MS).min(duration_ms);

        if silence_start_ms > cursor_ms {
            intervals.push(Interval {
                start_ms: cursor_ms,
                end_ms: silence_start_ms,
            });
        }
        cursor_ms = cursor_ms.max(silence_end_ms);
    }

    if cursor_ms < duration_ms {
        intervals.push(Interval {
            start_ms: cursor_ms,
            end_ms: duration_ms,
        });
    }

    intervals
}
