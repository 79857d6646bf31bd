//! Caption style presets.
//!
//! A caption style bundles the visual parameters written into the subtitle
//! script header with the behavioral parameters that drive word grouping and
//! animation markup. Presets are an immutable lookup table; unknown ids fall
//! back to the default.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a caption group animates on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptionAnimation {
    /// Each word's fill color switches on at that word's start time.
    BlockHighlight,
    /// Like block highlight with a short scale pulse per word.
    BounceHighlight,
    /// The whole group fades in and out as plain text.
    GroupFade,
}

impl CaptionAnimation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionAnimation::BlockHighlight => "block_highlight",
            CaptionAnimation::BounceHighlight => "bounce_highlight",
            CaptionAnimation::GroupFade => "group_fade",
        }
    }
}

impl fmt::Display for CaptionAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visual and behavioral parameters for one caption style.
///
/// Colors are ASS `&HAABBGGRR&` strings so the subtitle writer can embed them
/// without conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStylePreset {
    pub id: &'static str,
    /// Font size in canvas pixels.
    pub font_size: u32,
    pub font_name: &'static str,
    /// Fill color before/without highlight.
    pub primary_color: &'static str,
    /// Highlight fill color (karaoke sweep target).
    pub secondary_color: &'static str,
    pub outline_color: &'static str,
    pub back_color: &'static str,
    pub bold: bool,
    pub outline_width: f32,
    pub shadow: f32,
    /// ASS numpad alignment (2 = bottom center).
    pub alignment: u8,
    /// Maximum words displayed together.
    pub max_words: usize,
    /// Maximum silence between words, in milliseconds, before the current
    /// group is closed.
    pub max_gap_ms: u32,
    pub animation: CaptionAnimation,
}

/// Style id used when an unknown id is requested.
pub const DEFAULT_CAPTION_STYLE: &str = "impact";

/// Immutable caption style table.
pub const CAPTION_STYLES: &[CaptionStylePreset] = &[
    CaptionStylePreset {
        id: "impact",
        font_size: 96,
        font_name: "Montserrat ExtraBold",
        primary_color: "&H00FFFFFF&",
        secondary_color: "&H0000D7FF&",
        outline_color: "&H00000000&",
        back_color: "&H80000000&",
        bold: true,
        outline_width: 4.0,
        shadow: 1.0,
        alignment: 2,
        max_words: 4,
        max_gap_ms: 300,
        animation: CaptionAnimation::BlockHighlight,
    },
    CaptionStylePreset {
        id: "bounce",
        font_size: 88,
        font_name: "Poppins Black",
        primary_color: "&H00FFFFFF&",
        secondary_color: "&H0000FF9B&",
        outline_color: "&H00222222&",
        back_color: "&H00000000&",
        bold: true,
        outline_width: 3.5,
        shadow: 0.0,
        alignment: 2,
        max_words: 3,
        max_gap_ms: 250,
        animation: CaptionAnimation::BounceHighlight,
    },
    CaptionStylePreset {
        id: "subtle",
        font_size: 64,
        font_name: "Inter SemiBold",
        primary_color: "&H00FFFFFF&",
        secondary_color: "&H00FFFFFF&",
        outline_color: "&H00000000&",
        back_color: "&HA0000000&",
        bold: false,
        outline_width: 2.0,
        shadow: 0.5,
        alignment: 2,
        max_words: 7,
        max_gap_ms: 450,
        animation: CaptionAnimation::GroupFade,
    },
];

impl CaptionStylePreset {
    /// Look up a style by id, falling back to the default for unknown ids.
    pub fn by_id(id: &str) -> &'static CaptionStylePreset {
        CAPTION_STYLES.iter().find(|s| s.id == id).unwrap_or_else(|| {
            CAPTION_STYLES
                .iter()
                .find(|s| s.id == DEFAULT_CAPTION_STYLE)
                .expect("default caption style must exist")
        })
    }
}
