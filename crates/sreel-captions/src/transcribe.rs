//! Transcription service client.
//!
//! One audio file in, one ordered list of word-level timestamps out. The
//! service is a single synchronous call with a possible terminal error state;
//! retry policy belongs to the caller.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use sreel_models::Word;

use crate::error::{CaptionError, CaptionResult};

/// Configuration for the transcription service.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Service base URL.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TranscriberConfig {
    /// Create config from environment variables.
    ///
    /// A missing credential is a `MissingCredential` error; callers surface
    /// it as a "no captions" outcome rather than failing the job.
    pub fn from_env() -> CaptionResult<Self> {
        let api_url = std::env::var("TRANSCRIBE_API_URL")
            .map_err(|_| CaptionError::missing_credential("TRANSCRIBE_API_URL not set"))?;
        let api_key = std::env::var("TRANSCRIBE_API_KEY")
            .map_err(|_| CaptionError::missing_credential("TRANSCRIBE_API_KEY not set"))?;

        let timeout_secs = std::env::var("TRANSCRIBE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            api_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Word entry in the service response. Times are seconds.
#[derive(Debug, Deserialize)]
struct ApiWord {
    #[serde(alias = "word")]
    text: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    words: Vec<ApiWord>,
    #[serde(default)]
    language: Option<String>,
}

/// HTTP client for the transcription service.
#[derive(Clone)]
pub struct TranscriptionClient {
    http: reqwest::Client,
    config: TranscriberConfig,
}

impl TranscriptionClient {
    pub fn new(config: TranscriberConfig) -> CaptionResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> CaptionResult<Self> {
        Self::new(TranscriberConfig::from_env()?)
    }

    /// Transcribe one audio file into ordered word-level timestamps.
    ///
    /// Language is auto-detected by the service. Words come back ordered and
    /// non-overlapping; this client only converts units (seconds -> ms).
    pub async fn transcribe(&self, audio: impl AsRef<Path>) -> CaptionResult<Vec<Word>> {
        let audio = audio.as_ref();
        debug!("Submitting {} for transcription", audio.display());

        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("timestamps", "word")
            .text("language", "auto");

        let response = self
            .http
            .post(format!("{}/v1/transcribe", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::transcription_failed(format!(
                "service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: TranscribeResponse = response.json().await?;
        if parsed.words.is_empty() {
            return Err(CaptionError::EmptyTranscript);
        }

        info!(
            "Transcribed {} words (language: {})",
            parsed.words.len(),
            parsed.language.as_deref().unwrap_or("unknown")
        );

        Ok(parsed
            .words
            .into_iter()
            .map(|w| Word::new(w.text, secs_to_ms(w.start), secs_to_ms(w.end)))
            .collect())
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str) -> TranscriberConfig {
        TranscriberConfig {
            api_url: url.to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    async fn write_dummy_audio(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("narration.mp3");
        tokio::fs::write(&path, b"not really audio").await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_transcribe_parses_words() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "language": "en",
                "words": [
                    {"text": "hello", "start": 0.12, "end": 0.48},
                    {"text": "world", "start": 0.52, "end": 0.95}
                ]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = write_dummy_audio(&dir).await;

        let client = TranscriptionClient::new(test_config(&server.uri())).unwrap();
        let words = client.transcribe(&audio).await.unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0], Word::new("hello", 120, 480));
        assert_eq!(words[1].text, "world");
    }

    #[tokio::test]
    async fn test_transcribe_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = write_dummy_audio(&dir).await;

        let client = TranscriptionClient::new(test_config(&server.uri())).unwrap();
        let err = client.transcribe(&audio).await.unwrap_err();
        assert!(matches!(err, CaptionError::TranscriptionFailed(_)));
    }

    #[tokio::test]
    async fn test_transcribe_empty_words() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"words": []})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = write_dummy_audio(&dir).await;

        let client = TranscriptionClient::new(test_config(&server.uri())).unwrap();
        let err = client.transcribe(&audio).await.unwrap_err();
        assert!(matches!(err, CaptionError::EmptyTranscript));
    }
}
