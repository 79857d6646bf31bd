//! Story segment and aspect ratio definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One narration line plus its associated still image.
///
/// Segments are ordered and immutable once rendering begins. A video maps to
/// an ordered list of segments sharing one aspect ratio and one effect preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// Zero-based position within the story.
    pub order_index: usize,
    /// Narration text spoken over this segment.
    pub narration: String,
    /// Local path to the still image for this segment.
    pub image_path: String,
}

impl Segment {
    pub fn new(order_index: usize, narration: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            order_index,
            narration: narration.into(),
            image_path: image_path.into(),
        }
    }
}

/// Output aspect ratio for a generated video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 9:16 vertical (Shorts/Reels/TikTok)
    #[default]
    Portrait,
    /// 16:9 horizontal
    Landscape,
}

impl AspectRatio {
    /// Output frame size in pixels (width, height).
    pub fn frame_size(&self) -> (u32, u32) {
        match self {
            AspectRatio::Portrait => (1080, 1920),
            AspectRatio::Landscape => (1920, 1080),
        }
    }

    /// Bottom margin for burned-in captions, in canvas pixels.
    ///
    /// Vertical video gets a larger margin so captions clear platform UI
    /// overlays (like/share rails, progress bar).
    pub fn caption_margin_v(&self) -> u32 {
        match self {
            AspectRatio::Portrait => 280,
            AspectRatio::Landscape => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "portrait",
            AspectRatio::Landscape => "landscape",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "portrait" | "vertical" | "9:16" => Ok(AspectRatio::Portrait),
            "landscape" | "horizontal" | "16:9" => Ok(AspectRatio::Landscape),
            _ => Err(AspectRatioParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct AspectRatioParseError(String);
