//! Blocking client for the OpenAI `audio/transcriptions` endpoint.
//!
//! One multipart POST per clip: the encoded audio plus the configured model id,
//! language hint, and domain prompt. The response body is `{"text": "..."}`.
//! Failures (transport, auth, rate limit, malformed body) surface as
//! [`Error::Service`] and are never converted into an empty transcript.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::transcriber::Transcriber;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_MODEL: &str = "whisper-1";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-request upload filename. The service keys format detection off the
/// extension, which must match the clip encoder's output.
const UPLOAD_FILE_NAME: &str = "segment.flac";
const UPLOAD_MIME: &str = "audio/flac";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Connection settings and fixed hints for the transcription service.
#[derive(Debug, Clone)]
pub struct WhisperApiConfig {
    pub api_key: String,
    pub model: String,
    pub language: String,
    /// Domain prompt steering the model toward the expected vocabulary.
    pub prompt: Option<String>,
    pub endpoint: String,
}

impl WhisperApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            prompt: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// A reusable blocking HTTP client for the transcription service.
///
/// Construct once and share across the whole run; the underlying connection
/// pool is reused between clips.
pub struct WhisperApiClient {
    config: WhisperApiConfig,
    http: reqwest::blocking::Client,
}

impl WhisperApiClient {
    pub fn new(config: WhisperApiConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &WhisperApiConfig {
        &self.config
    }
}

impl Transcriber for WhisperApiClient {
    fn transcribe(&self, clip: &[u8]) -> Result<String> {
        let part = reqwest::blocking::multipart::Part::bytes(clip.to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)
            .map_err(|e| Error::service(format!("invalid upload part: {e}")))?;

        let mut form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone());

        if let Some(prompt) = &self.config.prompt {
            form = form.text("prompt", prompt.clone());
        }

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .map_err(|e| Error::service(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::service(format!("{status}: {body}")));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .map_err(|e| Error::service(format!("malformed response: {e}")))?;

        Ok(parsed.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_service_expectations() {
        let config = WhisperApiConfig::new("sk-test");
        assert_eq!(config.model, "whisper-1");
        assert_eq!(config.language, "en");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.prompt.is_none());
    }

    #[test]
    fn response_text_is_trimmed_like_the_adapter_output() {
        // The response struct itself carries the raw text; trimming happens in
        // `transcribe`. Keep the two in sync.
        let parsed: TranscriptionResponse =
            serde_json::from_str("{\"text\": \"  We are proactive.  \"}").unwrap();
        assert_eq!(parsed.text.trim(), "We are proactive.");
    }
}
