//! Word-synced caption synthesis for the Storyreel pipeline.
//!
//! Turns a narration audio file into a time-coded, style-driven ASS caption
//! script: transcription with word-level timestamps, punctuation sanitation,
//! greedy grouping, display-timing adjustment, and animation markup.
//!
//! Caption synthesis is best-effort by contract: a missing credential or a
//! transcription failure yields an explicit "no captions" outcome rather
//! than an error escaping to the caller.

pub mod ass;
pub mod error;
pub mod group;
pub mod transcribe;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use sreel_models::{AspectRatio, CaptionStylePreset};

pub use ass::{format_ass_time, render_script};
pub use error::{CaptionError, CaptionResult};
pub use group::{group_words, CaptionGroup, SNAP_THRESHOLD_MS, TRAIL_HOLD_MS};
pub use transcribe::{TranscriberConfig, TranscriptionClient};

/// Result of caption synthesis for one job.
#[derive(Debug)]
pub enum CaptionOutcome {
    /// Script written; ready for burn-in.
    Script {
        path: PathBuf,
        group_count: usize,
    },
    /// Captions could not be produced; the job continues without them.
    Unavailable { reason: String },
}

impl CaptionOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, CaptionOutcome::Script { .. })
    }
}

/// Caption synthesizer: transcription client plus script generation.
pub struct CaptionSynthesizer {
    client: Option<TranscriptionClient>,
}

impl CaptionSynthesizer {
    pub fn new(client: TranscriptionClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Create from environment variables.
    ///
    /// A missing transcription credential does not fail construction; the
    /// synthesizer is created in an "unavailable" state and every synthesis
    /// call signals `Unavailable`.
    pub fn from_env() -> Self {
        match TranscriptionClient::from_env() {
            Ok(client) => Self::new(client),
            Err(e) => {
                warn!("Caption synthesis unavailable: {}", e);
                Self { client: None }
            }
        }
    }

    /// Synthesize a caption script for one narration audio file.
    ///
    /// Never fails the job: any transcription error is converted into an
    /// `Unavailable` outcome and logged.
    pub async fn synthesize(
        &self,
        audio: impl AsRef<Path>,
        style_id: &str,
        aspect: AspectRatio,
        script_path: impl AsRef<Path>,
    ) -> CaptionOutcome {
        let client = match &self.client {
            Some(client) => client,
            None => {
                return CaptionOutcome::Unavailable {
                    reason: "transcription credential unavailable".to_string(),
                }
            }
        };

        let style = CaptionStylePreset::by_id(style_id);
        let script_path = script_path.as_ref();

        let words = match client.transcribe(audio.as_ref()).await {
            Ok(words) => words,
            Err(e) => {
                warn!("Transcription failed, continuing without captions: {}", e);
                return CaptionOutcome::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let groups = group_words(&words, style);
        if groups.is_empty() {
            return CaptionOutcome::Unavailable {
                reason: "no caption groups after sanitation".to_string(),
            };
        }

        let script = render_script(&groups, style, aspect);
        if let Err(e) = tokio::fs::write(script_path, script).await {
            warn!("Failed to write caption script: {}", e);
            return CaptionOutcome::Unavailable {
                reason: e.to_string(),
            };
        }

        info!(
            "Caption script written: {} ({} groups, style: {})",
            script_path.display(),
            groups.len(),
            style.id
        );

        CaptionOutcome::Script {
            path: script_path.to_path_buf(),
            group_count: groups.len(),
        }
    }
}
