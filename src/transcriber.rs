//! The transcription seam.

use crate::error::Result;

/// Pluggable speech-to-text client used by [`crate::runner::Pipeline`].
///
/// A transcriber turns one encoded clip buffer into text. The production
/// implementation is [`crate::whisper_api::WhisperApiClient`]; tests substitute
/// in-process doubles.
///
/// Contract:
/// - returned text is trimmed of surrounding whitespace
/// - an empty transcript is a valid success, never an error
/// - service, network, and auth failures surface as [`crate::Error::Service`]
pub trait Transcriber {
    fn transcribe(&self, clip: &[u8]) -> Result<String>;
}
