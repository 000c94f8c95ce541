use std::path::PathBuf;

use thiserror::Error;

/// Clipset's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Clipset's crate-wide error type.
///
/// Each variant corresponds to one failure domain of the pipeline, so callers can
/// tell a bad source file from a failed service call from a damaged dataset file
/// without string matching.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A source file exists but could not be decoded as audio.
    #[error("failed to decode '{path}': {message}")]
    Decode { path: PathBuf, message: String },

    /// A clip could not be encoded to its compressed byte form.
    #[error("failed to encode clip: {message}")]
    Encode { message: String },

    /// The transcription service rejected or failed a request.
    #[error("transcription service error: {message}")]
    Service { message: String },

    /// The dataset (or backup) file could not be read or written.
    #[error("persistence error for '{path}': {message}")]
    Persistence { path: PathBuf, message: String },

    /// The run configuration is missing, malformed, or inconsistent.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        Self::Decode {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub(crate) fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_display_includes_path_and_cause() {
        let err = Error::decode("audio/missing.m4a", anyhow::anyhow!("no audio track found"));
        assert_eq!(
            err.to_string(),
            "failed to decode 'audio/missing.m4a': no audio track found"
        );
    }

    #[test]
    fn service_display() {
        let err = Error::service("429 Too Many Requests");
        assert_eq!(
            err.to_string(),
            "transcription service error: 429 Too Many Requests"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
