//! In-memory waveform representation.
//!
//! Every decoded source is normalized into a `Waveform`: mono `f32` samples in
//! `[-1.0, 1.0]` at the crate's target sample rate. Downstream components address
//! audio exclusively by millisecond offsets, so the conversion math lives here in
//! one place.

/// Clipset's target mono sample rate (Hz).
///
/// All decoded audio is downmixed and resampled to this rate before segmentation,
/// so interval math and clip encoding never have to care about source formats.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// A decoded recording: mono `f32` samples at [`TARGET_SAMPLE_RATE`].
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap normalized mono samples at the target sample rate.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: TARGET_SAMPLE_RATE,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration in whole milliseconds (truncating; a final sub-millisecond
    /// tail still belongs to the last interval via index clamping).
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64) * 1000 / self.sample_rate as u64
    }

    /// Borrow the sample range covering `[start_ms, end_ms)`.
    ///
    /// Offsets are clamped into the buffer, and an inverted range yields an empty
    /// slice, so callers can pass padded interval bounds without pre-validation.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> &[f32] {
        let start = self.ms_to_index(start_ms);
        let end = self.ms_to_index(end_ms).max(start);
        &self.samples[start..end]
    }

    fn ms_to_index(&self, ms: u64) -> usize {
        let idx = ms.saturating_mul(self.sample_rate as u64) / 1000;
        (idx as usize).min(self.samples.len())
    }
}
