//! Clip extraction.
//!
//! Takes one segmentation interval, widens it with lead/trail padding (clamped
//! into the waveform), and encodes the sample range to a FLAC byte buffer.
//! Padding exists so clip boundaries do not shave word onsets and codas.
//!
//! Persisted clips land at `{dir}/{key}/{NN}.flac` with a zero-padded two-digit
//! index; re-running overwrites, so the last run's content wins.

use std::path::{Path, PathBuf};

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::error::{Error, Result};
use crate::segmenter::Interval;
use crate::waveform::Waveform;

/// Padding applied around each interval before encoding.
#[derive(Debug, Clone, Copy)]
pub struct ClipPolicy {
    /// Widening before `start_ms`, clamped to 0.
    pub lead_pad_ms: u64,

    /// Widening after `end_ms`, clamped to the waveform duration.
    pub trail_pad_ms: u64,
}

/// Default padding: slightly more tail than lead, since trailing consonants
/// decay slower than onsets attack.
pub const DEFAULT_CLIP_POLICY: ClipPolicy = ClipPolicy {
    lead_pad_ms: 200,
    trail_pad_ms: 300,
};

impl Default for ClipPolicy {
    fn default() -> Self {
        DEFAULT_CLIP_POLICY
    }
}

/// Compute the padded `[start_ms, end_ms)` bounds for an interval.
pub fn padded_bounds(interval: Interval, policy: ClipPolicy, duration_ms: u64) -> (u64, u64) {
    let start_ms = interval.start_ms.saturating_sub(policy.lead_pad_ms);
    let end_ms = (interval.end_ms + policy.trail_pad_ms).min(duration_ms);
    (start_ms, end_ms)
}

/// Extract one padded interval from the waveform as an encoded FLAC buffer.
///
/// Deterministic: identical samples and policy produce identical bytes.
pub fn extract(waveform: &Waveform, interval: Interval, policy: ClipPolicy) -> Result<Vec<u8>> {
    let (start_ms, end_ms) = padded_bounds(interval, policy, waveform.duration_ms());
    encode_flac(waveform.slice_ms(start_ms, end_ms), waveform.sample_rate())
}

/// The on-disk location for clip `index` of source `key`.
pub fn clip_path(dir: &Path, key: &str, index: usize) -> PathBuf {
    dir.join(key).join(format!("{index:02}.flac"))
}

/// Write an encoded clip to its derived path, creating directories as needed
/// and overwriting any previous content.
pub fn write_clip(dir: &Path, key: &str, index: usize, bytes: &[u8]) -> Result<PathBuf> {
    let path = clip_path(dir, key, index);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Encode normalized mono `f32` samples to FLAC (16-bit).
fn encode_flac(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let pcm: Vec<i32> = samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i32)
        .collect();

    let source = MemSource::from_samples(&pcm, 1, 16, sample_rate as usize);

    let config = flacenc::config::Encoder::default();
    let config = config
        .into_verified()
        .map_err(|e| Error::encode(format!("invalid FLAC encoder config: {e:?}")))?;

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| Error::encode(format!("FLAC encoding failed: {e:?}")))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| Error::encode(format!("FLAC stream write failed: {e:?}")))?;

    Ok(sink.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start_ms: u64, end_ms: u64) -> Interval {
        Interval { start_ms, end_ms }
    }

    #[test]
    fn padding_clamps_at_zero() {
        let (start, end) = padded_bounds(interval(100, 600), DEFAULT_CLIP_POLICY, 10_000);
        assert_eq!((start, end), (0, 900));
    }

    #[test]
    fn padding_clamps_at_duration() {
        let (start, end) = padded_bounds(interval(9_500, 9_900), DEFAULT_CLIP_POLICY, 10_000);
        assert_eq!((start, end), (9_300, 10_000));
    }

    #[test]
    fn padding_applies_both_sides_in_range() {
        let (start, end) = padded_bounds(interval(1_000, 2_000), DEFAULT_CLIP_POLICY, 10_000);
        assert_eq!((start, end), (800, 2_300));
    }

    #[test]
    fn extract_round_trips_through_flac() -> anyhow::Result<()> {
        // 1s of a 440Hz tone; extract the middle 500ms (padded to 1s by clamping).
        let rate = crate::waveform::TARGET_SAMPLE_RATE;
        let samples: Vec<f32> = (0..rate)
            .map(|i| {
                let t = i as f32 / rate as f32;
                (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.6
            })
            .collect();
        let wf = Waveform::new(samples);

        let bytes = extract(&wf, interval(250, 750), DEFAULT_CLIP_POLICY)?;
        assert!(!bytes.is_empty());

        let mut reader = claxon::FlacReader::new(std::io::Cursor::new(&bytes))?;
        let info = reader.streaminfo();
        assert_eq!(info.sample_rate, rate);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);

        // Padded bounds: [50, 1000) ms = 950ms of samples. The encoder may pad
        // the final block, so allow slack above the expected count.
        let expected = (rate as usize * 950) / 1000;
        let decoded: Vec<i32> = reader.samples().collect::<std::result::Result<_, _>>()?;
        assert!(decoded.len() >= expected);
        assert!(decoded.len() < expected + 8_192);
        Ok(())
    }

    #[test]
    fn extract_is_deterministic() -> anyhow::Result<()> {
        let wf = Waveform::new(vec![0.25; 16_000]);
        let a = extract(&wf, interval(100, 400), DEFAULT_CLIP_POLICY)?;
        let b = extract(&wf, interval(100, 400), DEFAULT_CLIP_POLICY)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn clip_path_uses_zero_padded_index() {
        let path = clip_path(Path::new("clips"), "adj", 3);
        assert_eq!(path, Path::new("clips").join("adj").join("03.flac"));
    }

    #[test]
    fn write_clip_overwrites_previous_content() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_clip(dir.path(), "past", 0, b"one")?;
        let second = write_clip(dir.path(), "past", 0, b"two")?;

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second)?, b"two");
        Ok(())
    }
}
