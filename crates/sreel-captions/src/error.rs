//! Caption synthesis error types.

use thiserror::Error;

/// Result type for caption operations.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Errors that can occur during caption synthesis.
///
/// All of these resolve to a "no captions" outcome at the synthesizer
/// boundary; none aborts a generation job.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Transcription credential unavailable: {0}")]
    MissingCredential(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcript contained no words")]
    EmptyTranscript,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptionError {
    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    pub fn transcription_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptionFailed(msg.into())
    }
}
