//! Transcription collaborator client
//!
//! Converts uploaded call audio into transcript text. The transcription
//! service is an external collaborator reached over HTTP; this client
//! enforces the declared payload constraints before any network call.

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "CallQA/0.1.0 (+https://github.com/callqa/callqa)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum audio payload accepted by the transcription collaborator
pub const MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

/// Transcription client errors
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Payload too large: {size} bytes (maximum {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Transcription service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Audio formats the transcription collaborator declares support for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Webm,
    Ogg,
}

impl AudioFormat {
    /// Derive the format from an upload filename extension
    pub fn from_filename(filename: &str) -> Option<AudioFormat> {
        let extension = filename.rsplit_once('.')?.1;
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "m4a" => Some(AudioFormat::M4a),
            "webm" => Some(AudioFormat::Webm),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
            AudioFormat::Webm => "webm",
            AudioFormat::Ogg => "ogg",
        }
    }
}

/// Transcription collaborator interface
///
/// The pipeline is generic over this trait so tests can substitute stubs.
pub trait Transcriber {
    fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
    ) -> impl std::future::Future<Output = Result<String, TranscribeError>> + Send;
}

#[derive(Debug, Serialize)]
struct TranscribeRequest<'a> {
    format: &'a str,
    audio_base64: String,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// HTTP transcription client
pub struct TranscriptionClient {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    max_payload_bytes: u64,
}

impl TranscriptionClient {
    pub fn new(
        url: String,
        api_key: Option<String>,
        max_payload_bytes: u64,
    ) -> Result<Self, TranscribeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            api_key,
            max_payload_bytes: max_payload_bytes.min(MAX_AUDIO_BYTES),
        })
    }
}

impl Transcriber for TranscriptionClient {
    async fn transcribe(&self, audio: &[u8], format: AudioFormat) -> Result<String, TranscribeError> {
        let size = audio.len() as u64;
        if size > self.max_payload_bytes {
            return Err(TranscribeError::PayloadTooLarge {
                size,
                max: self.max_payload_bytes,
            });
        }

        let request = TranscribeRequest {
            format: format.as_str(),
            audio_base64: BASE64_STANDARD.encode(audio),
        };

        tracing::debug!(bytes = size, format = format.as_str(), "Requesting transcription");

        let mut builder = self.http_client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            413 => {
                return Err(TranscribeError::PayloadTooLarge {
                    size,
                    max: self.max_payload_bytes,
                })
            }
            415 => return Err(TranscribeError::UnsupportedFormat(format.as_str().to_string())),
            _ if !status.is_success() => {
                let error_text = response.text().await.unwrap_or_default();
                return Err(TranscribeError::ServiceUnavailable(format!(
                    "HTTP {status}: {error_text}"
                )));
            }
            _ => {}
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        tracing::info!(chars = body.text.len(), "Transcription completed");
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(AudioFormat::from_filename("call.mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_filename("CALL.WAV"), Some(AudioFormat::Wav));
        assert_eq!(
            AudioFormat::from_filename("meeting.recording.ogg"),
            Some(AudioFormat::Ogg)
        );
        assert_eq!(AudioFormat::from_filename("call.flac"), None);
        assert_eq!(AudioFormat::from_filename("noextension"), None);
    }

    #[test]
    fn test_client_creation() {
        let client = TranscriptionClient::new(
            "http://127.0.0.1:8090/v1/transcribe".to_string(),
            None,
            MAX_AUDIO_BYTES,
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_before_network() {
        // Unroutable URL: an attempted request would error differently
        let client = TranscriptionClient::new(
            "http://127.0.0.1:1/v1/transcribe".to_string(),
            None,
            8,
        )
        .unwrap();

        let err = client
            .transcribe(b"123456789", AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranscribeError::PayloadTooLarge { size: 9, max: 8 }
        ));
    }
}
