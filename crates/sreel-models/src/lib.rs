//! Shared data models for the Storyreel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Generation jobs and their lifecycle
//! - Story segments (narration line + still image)
//! - Duration plans for splitting narration audio across segments
//! - Camera motion presets and caption style presets
//! - Word-level transcription timestamps
//! - Encoding configuration and credit costs

pub mod credit_cost;
pub mod effect;
pub mod encoding;
pub mod job;
pub mod plan;
pub mod segment;
pub mod style;
pub mod word;

// Re-export common types
pub use credit_cost::{
    CostBreakdown, GenerationCostCalculator, AUDIO_COST_PER_MINUTE, CAPTION_ADDON_COST,
    SEGMENT_IMAGE_COST,
};
pub use effect::{resolve_motion, EffectPreset, MotionPrimitive, DEFAULT_EFFECT_PRESET};
pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobStage};
pub use plan::{DurationPlan, MIN_CLIP_SECS};
pub use segment::{AspectRatio, Segment};
pub use style::{CaptionAnimation, CaptionStylePreset, DEFAULT_CAPTION_STYLE};
pub use word::Word;
