//! Whole-buffer resampling to the target sample rate.
//!
//! Sources are decoded completely before segmentation, so resampling happens in
//! one pass here rather than inside a streaming pipeline. rubato wants exact
//! input block sizes, so the tail is zero-padded and the output trimmed back to
//! the expected frame count.

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, WindowFunction};

/// Resample a mono buffer from `src_rate` to `dst_rate`.
///
/// Same-rate input is returned unchanged.
pub fn resample_mono(samples: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>> {
    if src_rate == dst_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if src_rate == 0 {
        bail!("source sample rate is zero");
    }

    // How many source frames we feed rubato per `process()` call.
    let block_frames = 2048usize;

    let ratio = dst_rate as f64 / src_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        rubato::SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        block_frames,
        1, // mono
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let expected_frames = (samples.len() as f64 * ratio).round() as usize;

    let mut padded = samples.to_vec();
    let rem = padded.len() % block_frames;
    if rem != 0 {
        padded.resize(padded.len() + (block_frames - rem), 0.0);
    }

    let mut out = Vec::with_capacity(expected_frames + block_frames);
    for block in padded.chunks(block_frames) {
        let output = resampler
            .process(&[block], None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;

        if output.len() != 1 {
            bail!("expected mono output from resampler");
        }
        out.extend_from_slice(&output[0]);
    }

    out.truncate(expected_frames);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() -> anyhow::Result<()> {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_mono(&samples, 16_000, 16_000)?, samples);
        Ok(())
    }

    #[test]
    fn empty_input_stays_empty() -> anyhow::Result<()> {
        assert!(resample_mono(&[], 48_000, 16_000)?.is_empty());
        Ok(())
    }

    #[test]
    fn downsampling_scales_frame_count() -> anyhow::Result<()> {
        // 1s at 48kHz -> ~1s at 16kHz.
        let samples = vec![0.25; 48_000];
        let out = resample_mono(&samples, 48_000, 16_000)?;
        assert!(out.len() <= 16_000);
        assert!(out.len() >= 15_000);
        Ok(())
    }

    #[test]
    fn upsampling_scales_frame_count() -> anyhow::Result<()> {
        let samples = vec![0.25; 8_000];
        let out = resample_mono(&samples, 8_000, 16_000)?;
        assert!(out.len() <= 16_000);
        assert!(out.len() >= 15_000);
        Ok(())
    }
}
