//! Media decoding into a [`Waveform`].
//!
//! Responsibilities:
//! - probe the container and pick a decodable audio track
//! - decode packets to PCM, downmixing to mono as they arrive
//! - resample once at the end when the source rate differs from the target
//!
//! Input is a seekable file. Study sources are regular on-disk recordings, and
//! common M4A layouts keep their metadata at the end of the file, which rules
//! out an unseekable stream-only mode.
//!
//! Error handling policy (per packet):
//! - decode errors skip the bad frame (common with some codecs)
//! - IO errors are treated as end-of-stream
//! - anything else is fatal and surfaces as [`crate::Error::Decode`]

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result as AnyResult, anyhow, bail};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};
use crate::resample::resample_mono;
use crate::waveform::{TARGET_SAMPLE_RATE, Waveform};

/// Decode an audio file into a normalized mono waveform.
pub fn decode_file(path: &Path) -> Result<Waveform> {
    decode_file_inner(path).map_err(|e| Error::decode(path, e))
}

fn decode_file_inner(path: &Path) -> AnyResult<Waveform> {
    let file = File::open(path).context("failed to open source file")?;
    let (mut format, track) = probe_file(file, path)?;

    let src_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow!("selected track has no sample rate"))?;

    let mut decoder = make_decoder(&track)?;
    let mut mono = Vec::<f32>::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;

    while let Some(packet) = next_packet(&mut format)? {
        if packet.track_id() != track.id {
            continue;
        }
        decode_packet_into_mono(&mut decoder, &packet, &mut scratch, &mut mono)?;
    }

    let samples = resample_mono(&mono, src_rate, TARGET_SAMPLE_RATE)
        .context("failed to resample decoded audio")?;
    Ok(Waveform::new(samples))
}

/// Probe the container and pick a default audio track.
///
/// Track selection policy:
/// - choose the first track that looks decodable (codec != NULL)
/// - and has a known sample rate (required for the resampling decision)
///
/// The file extension is passed as a probe hint; it helps disambiguate
/// containers that share byte signatures.
fn probe_file(file: File, path: &Path) -> AnyResult<(Box<dyn FormatReader>, Track)> {
    let mss_opts = MediaSourceStreamOptions {
        // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
        buffer_len: 256 * 1024,
    };
    let mss = MediaSourceStream::new(Box::new(file), mss_opts);

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let format_opts: FormatOptions = Default::default();
    let metadata_opts: MetadataOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| anyhow!(e))
        .context("failed to probe media file")?;

    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    Ok((format, track))
}

fn make_decoder(track: &Track) -> AnyResult<Box<dyn Decoder>> {
    let decoder_opts: DecoderOptions = Default::default();

    symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")
}

/// Read the next packet, treating IO errors as "end of stream".
fn next_packet(format: &mut Box<dyn FormatReader>) -> AnyResult<Option<Packet>> {
    match format.next_packet() {
        Ok(p) => Ok(Some(p)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}

/// Decode one packet and append its content to `mono`, downmixed.
fn decode_packet_into_mono(
    decoder: &mut Box<dyn Decoder>,
    packet: &Packet,
    scratch: &mut Option<SampleBuffer<f32>>,
    mono: &mut Vec<f32>,
) -> AnyResult<()> {
    let decoded = match decoder.decode(packet) {
        Ok(buf) => buf,
        // Recoverable: corrupted frame, but decoding can continue.
        Err(SymphoniaError::DecodeError(_)) => return Ok(()),
        // Treat IO errors as graceful end-of-stream.
        Err(SymphoniaError::IoError(_)) => return Ok(()),
        Err(e) => return Err(anyhow!(e)).context("decoder failure"),
    };

    let spec = *decoded.spec();
    let channels = spec.channels.count();
    if channels == 0 {
        bail!("decoded audio had zero channels");
    }

    let buf = scratch
        .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
    buf.copy_interleaved_ref(decoded);

    downmix_into(buf.samples(), channels, mono);
    Ok(())
}

/// Append interleaved samples to `mono`, averaging channels with equal weight.
fn downmix_into(interleaved: &[f32], channels: usize, mono: &mut Vec<f32>) {
    if channels == 1 {
        mono.extend_from_slice(interleaved);
        return;
    }

    for frame in interleaved.chunks_exact(channels) {
        mono.push(frame.iter().sum::<f32>() / channels as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel_is_identity() {
        let mut mono = Vec::new();
        downmix_into(&[0.0, 1.0, -1.0], 1, &mut mono);
        assert_eq!(mono, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        // Two frames of stereo: (L=1, R=3), (L=-1, R=1) => mono: 2, 0
        let mut mono = Vec::new();
        downmix_into(&[1.0, 3.0, -1.0, 1.0], 2, &mut mono);
        assert_eq!(mono, vec![2.0, 0.0]);
    }

    #[test]
    fn downmix_appends_across_calls() {
        let mut mono = vec![9.0];
        downmix_into(&[1.0, 1.0], 2, &mut mono);
        assert_eq!(mono, vec![9.0, 1.0]);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_file(Path::new("does/not/exist.mp3")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"this is not audio")?;

        let err = decode_file(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        Ok(())
    }
}
