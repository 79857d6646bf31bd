//! Credit cost calculation for generation jobs.
//!
//! Follows the builder pattern and returns a structured breakdown so the
//! orchestrator can charge up front and refund exact portions on partial
//! failure (a failed segment, or a failed caption stage).

use std::collections::HashMap;

/// Credits per generated segment image.
pub const SEGMENT_IMAGE_COST: u32 = 5;

/// Credits per started minute of narration audio.
pub const AUDIO_COST_PER_MINUTE: u32 = 4;

/// Flat credits for word-synced captions on one video.
pub const CAPTION_ADDON_COST: u32 = 5;

/// Itemized credit costs for one generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostBreakdown {
    /// Per-segment image cost (uniform).
    pub per_segment: u32,
    /// Number of segments priced.
    pub segment_count: u32,
    /// Total for all segment images.
    pub segments_total: u32,
    /// Narration audio cost.
    pub audio_cost: u32,
    /// Caption cost (0 when captions were not requested).
    pub caption_cost: u32,
    /// Grand total.
    pub total: u32,
}

impl CostBreakdown {
    /// The portion charged for audio plus captions, charged together once
    /// the narration duration is known.
    pub fn audio_and_caption_total(&self) -> u32 {
        self.audio_cost + self.caption_cost
    }

    /// Human-readable description for ledger transactions.
    pub fn to_description(&self) -> String {
        let seg_text = if self.segment_count == 1 {
            "segment"
        } else {
            "segments"
        };
        if self.caption_cost > 0 {
            format!(
                "Generate {} {} + narration + captions",
                self.segment_count, seg_text
            )
        } else {
            format!("Generate {} {} + narration", self.segment_count, seg_text)
        }
    }

    /// Metadata map for ledger transaction recording.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert("segment_count".to_string(), self.segment_count.to_string());
        metadata.insert("segment_credits".to_string(), self.segments_total.to_string());
        metadata.insert("audio_credits".to_string(), self.audio_cost.to_string());
        if self.caption_cost > 0 {
            metadata.insert("captions".to_string(), "true".to_string());
            metadata.insert("caption_credits".to_string(), self.caption_cost.to_string());
        }
        metadata.insert("total_credits".to_string(), self.total.to_string());
        metadata
    }
}

/// Builder for generation job costs.
#[derive(Debug, Clone)]
pub struct GenerationCostCalculator {
    segment_count: u32,
    audio_secs: f64,
    captions: bool,
}

impl GenerationCostCalculator {
    pub fn new(segment_count: u32, audio_secs: f64) -> Self {
        Self {
            segment_count,
            audio_secs,
            captions: false,
        }
    }

    /// Include the caption addon in the total.
    pub fn with_captions(mut self, enabled: bool) -> Self {
        self.captions = enabled;
        self
    }

    pub fn calculate(&self) -> CostBreakdown {
        let segments_total = SEGMENT_IMAGE_COST * self.segment_count;
        let minutes = (self.audio_secs / 60.0).ceil().max(1.0) as u32;
        let audio_cost = AUDIO_COST_PER_MINUTE * minutes;
        let caption_cost = if self.captions { CAPTION_ADDON_COST } else { 0 };

        CostBreakdown {
            per_segment: SEGMENT_IMAGE_COST,
            segment_count: self.segment_count,
            segments_total,
            audio_cost,
            caption_cost,
            total: segments_total + audio_cost + caption_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_breakdown() {
        let cost = GenerationCostCalculator::new(4, 45.0).calculate();
        assert_eq!(cost.segments_total, 20);
        assert_eq!(cost.audio_cost, 4); // one started minute
        assert_eq!(cost.caption_cost, 0);
        assert_eq!(cost.total, 24);
    }

    #[test]
    fn test_caption_addon() {
        let cost = GenerationCostCalculator::new(3, 90.0)
            .with_captions(true)
            .calculate();
        assert_eq!(cost.audio_cost, 8); // two started minutes
        assert_eq!(cost.caption_cost, CAPTION_ADDON_COST);
        assert_eq!(cost.audio_and_caption_total(), 13);
        assert_eq!(cost.total, 15 + 8 + 5);
    }

    #[test]
    fn test_short_audio_charges_one_minute() {
        let cost = GenerationCostCalculator::new(1, 3.0).calculate();
        assert_eq!(cost.audio_cost, AUDIO_COST_PER_MINUTE);
    }

    #[test]
    fn test_description() {
        let cost = GenerationCostCalculator::new(1, 10.0).calculate();
        assert_eq!(cost.to_description(), "Generate 1 segment + narration");

        let cost = GenerationCostCalculator::new(2, 10.0)
            .with_captions(true)
            .calculate();
        assert_eq!(
            cost.to_description(),
            "Generate 2 segments + narration + captions"
        );
    }

    #[test]
    fn test_metadata() {
        let cost = GenerationCostCalculator::new(2, 10.0)
            .with_captions(true)
            .calculate();
        let metadata = cost.to_metadata();
        assert_eq!(metadata.get("segment_count"), Some(&"2".to_string()));
        assert_eq!(metadata.get("captions"), Some(&"true".to_string()));
        assert_eq!(
            metadata.get("total_credits"),
            Some(&cost.total.to_string())
        );
    }
}
