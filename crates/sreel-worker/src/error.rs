//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u32, available: i64 },

    #[error("Too few viable segments: {viable} of {total} (need {required})")]
    TooFewSegments {
        viable: usize,
        total: usize,
        required: usize,
    },

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] sreel_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] sreel_storage::StorageError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] sreel_ledger::LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if error is retryable. Transient network and storage failures
    /// are; policy failures (credits, segment count, cancellation) are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::DownloadFailed(_)
                | WorkerError::UploadFailed(_)
                | WorkerError::Storage(_)
                | WorkerError::Ledger(_)
        )
    }

    /// Short reason safe to surface to the user. Process output and stack
    /// traces stay in logs.
    pub fn user_message(&self) -> String {
        match self {
            WorkerError::InsufficientCredits { needed, available } => {
                format!("Not enough credits ({available} available, {needed} required)")
            }
            WorkerError::TooFewSegments { viable, total, .. } => {
                format!("Only {viable} of {total} scenes were generated")
            }
            WorkerError::Cancelled => "Generation was cancelled".to_string(),
            WorkerError::Media(_) | WorkerError::RenderFailed(_) => {
                "Video rendering failed".to_string()
            }
            WorkerError::Storage(_) | WorkerError::UploadFailed(_) => {
                "Could not deliver the finished video".to_string()
            }
            WorkerError::DownloadFailed(_) => "Could not fetch generated assets".to_string(),
            _ => "Video generation failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internals() {
        let err = WorkerError::render_failed("ffmpeg exited with code 234: stderr blob");
        assert!(!err.user_message().contains("ffmpeg"));
        assert!(!err.user_message().contains("234"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(WorkerError::upload_failed("timeout").is_retryable());
        assert!(WorkerError::download_failed("connection reset").is_retryable());
        assert!(!WorkerError::Cancelled.is_retryable());
        assert!(!WorkerError::InsufficientCredits {
            needed: 30,
            available: 12,
        }
        .is_retryable());
        assert!(!WorkerError::render_failed("exit 1").is_retryable());
    }

    #[test]
    fn test_insufficient_credits_message() {
        let err = WorkerError::InsufficientCredits {
            needed: 30,
            available: 12,
        };
        assert_eq!(
            err.user_message(),
            "Not enough credits (12 available, 30 required)"
        );
    }
}
