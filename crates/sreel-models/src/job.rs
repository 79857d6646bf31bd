//! Generation job definitions and lifecycle.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::AspectRatio;

/// Unique identifier for a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage of a generation job.
///
/// Failure is reachable from every non-terminal stage; `CompositingCaptions`
/// is skipped when captions were not requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    #[default]
    Queued,
    GeneratingAudio,
    RenderingVisuals,
    CompositingCaptions,
    Uploading,
    Completed,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Queued => "queued",
            JobStage::GeneratingAudio => "generating_audio",
            JobStage::RenderingVisuals => "rendering_visuals",
            JobStage::CompositingCaptions => "compositing_captions",
            JobStage::Uploading => "uploading",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One video generation job.
///
/// Mutated only by the pipeline orchestrator; terminal on first unrecoverable
/// error or successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub id: JobId,

    /// Owning user.
    pub user_id: String,

    /// Display title for the generated video.
    pub title: String,

    /// Output aspect ratio.
    #[serde(default)]
    pub aspect: AspectRatio,

    /// Effect preset id driving camera motion.
    pub effect_preset: String,

    /// Caption style id; `None` means captions were not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_style: Option<String>,

    /// Current pipeline stage.
    #[serde(default)]
    pub stage: JobStage,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Completed at timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Short human-readable failure reason (internal traces stay in logs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Progress (0-100).
    #[serde(default)]
    pub progress: u8,

    /// Public URL of the delivered video, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}

impl Job {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        aspect: AspectRatio,
        effect_preset: impl Into<String>,
        caption_style: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            user_id: user_id.into(),
            title: title.into(),
            aspect,
            effect_preset: effect_preset.into(),
            caption_style,
            stage: JobStage::Queued,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error_message: None,
            progress: 0,
            final_url: None,
        }
    }

    /// Whether captions were requested for this job.
    pub fn wants_captions(&self) -> bool {
        self.caption_style.is_some()
    }

    /// Move to a new pipeline stage. No-op once terminal.
    pub fn advance(&mut self, stage: JobStage) {
        if self.stage.is_terminal() {
            return;
        }
        self.stage = stage;
        self.updated_at = Utc::now();
    }

    /// Mark completed with the delivered URL.
    pub fn complete(&mut self, final_url: impl Into<String>) {
        self.stage = JobStage::Completed;
        self.final_url = Some(final_url.into());
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self.progress = 100;
    }

    /// Mark failed with a short user-facing reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.stage == JobStage::Completed {
            return;
        }
        self.stage = JobStage::Failed;
        self.error_message = Some(reason.into());
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Update progress, clamped to 100.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job() -> Job {
        Job::new(
            "user123",
            "The Fall of Rome",
            AspectRatio::Portrait,
            "ken_burns",
            Some("impact".to_string()),
        )
    }

    #[test]
    fn test_job_creation() {
        let job = test_job();
        assert_eq!(job.stage, JobStage::Queued);
        assert!(job.wants_captions());
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn test_stage_transitions() {
        let mut job = test_job();
        job.advance(JobStage::GeneratingAudio);
        job.advance(JobStage::RenderingVisuals);
        assert_eq!(job.stage, JobStage::RenderingVisuals);

        job.complete("https://cdn.example.com/final.mp4");
        assert_eq!(job.stage, JobStage::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_terminal_stages_are_sticky() {
        let mut job = test_job();
        job.fail("render failed");
        job.advance(JobStage::Uploading);
        assert_eq!(job.stage, JobStage::Failed);

        let mut job = test_job();
        job.complete("https://cdn.example.com/final.mp4");
        job.fail("too late");
        assert_eq!(job.stage, JobStage::Completed);
    }

    #[test]
    fn test_failure_reason_surfaced() {
        let mut job = test_job();
        job.fail("Not enough credits");
        assert_eq!(job.error_message.as_deref(), Some("Not enough credits"));
        assert!(job.stage.is_terminal());
    }
}
