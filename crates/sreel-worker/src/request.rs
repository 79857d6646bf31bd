//! Generation request as handed to the worker.
//!
//! The upstream generation services (image and narration synthesis) run
//! before this pipeline; their per-segment failures arrive recorded on the
//! request rather than as live errors.

use serde::{Deserialize, Serialize};

use sreel_models::{AspectRatio, DEFAULT_EFFECT_PRESET};

/// One segment's generated assets, or the error that prevented them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSource {
    /// Narration line this segment covers.
    pub narration: String,

    /// URL of the generated still image. `None` when generation failed.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Upstream generation error, if any.
    #[serde(default)]
    pub generation_error: Option<String>,
}

impl SegmentSource {
    /// Whether this segment has usable assets.
    pub fn is_viable(&self) -> bool {
        self.image_url.is_some() && self.generation_error.is_none()
    }
}

/// A complete generation request consumed by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_id: String,

    pub title: String,

    #[serde(default)]
    pub aspect: AspectRatio,

    #[serde(default = "default_effect_preset")]
    pub effect_preset: String,

    /// Caption style id; `None` means captions were not requested.
    #[serde(default)]
    pub caption_style: Option<String>,

    /// URL of the generated narration audio for the whole video.
    pub narration_audio_url: String,

    /// Ordered segments. Order here is the final video order.
    pub segments: Vec<SegmentSource>,
}

fn default_effect_preset() -> String {
    DEFAULT_EFFECT_PRESET.to_string()
}

impl GenerationRequest {
    /// Indices of segments whose upstream generation failed.
    pub fn failed_segment_indices(&self) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_viable())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn wants_captions(&self) -> bool {
        self.caption_style.is_some()
    }
}

/// Minimum number of viable segments for the job to proceed.
///
/// At least half the requested segments, rounded up, and never zero.
pub fn min_viable_segments(total: usize) -> usize {
    total.div_ceil(2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(ok: bool) -> SegmentSource {
        SegmentSource {
            narration: "A line of narration.".to_string(),
            image_url: ok.then(|| "https://cdn.example.com/img.png".to_string()),
            generation_error: (!ok).then(|| "image model refused".to_string()),
        }
    }

    #[test]
    fn test_failed_segment_indices() {
        let request = GenerationRequest {
            user_id: "u1".to_string(),
            title: "Test".to_string(),
            aspect: AspectRatio::Portrait,
            effect_preset: "ken_burns".to_string(),
            caption_style: None,
            narration_audio_url: "https://cdn.example.com/narration.mp3".to_string(),
            segments: vec![segment(true), segment(false), segment(true)],
        };
        assert_eq!(request.failed_segment_indices(), vec![1]);
    }

    #[test]
    fn test_min_viable_segments() {
        assert_eq!(min_viable_segments(1), 1);
        assert_eq!(min_viable_segments(2), 1);
        assert_eq!(min_viable_segments(3), 2);
        assert_eq!(min_viable_segments(4), 2);
        assert_eq!(min_viable_segments(5), 3);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{
            "user_id": "u1",
            "title": "Rome",
            "narration_audio_url": "https://cdn.example.com/n.mp3",
            "segments": [{"narration": "Rome fell.", "image_url": "https://cdn.example.com/0.png"}]
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.effect_preset, DEFAULT_EFFECT_PRESET);
        assert!(!request.wants_captions());
        assert!(request.segments[0].is_viable());
    }
}
