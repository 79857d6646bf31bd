//! Camera motion presets.
//!
//! An effect preset is a cyclic sequence of motion primitives. Resolution for
//! segment `i` is `sequence[i % len]`, so the same (preset, index) pair always
//! yields the same primitive. Retries and previews depend on that determinism.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One named camera-movement behavior applied to a still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MotionPrimitive {
    /// No motion, scale/pad to the output box
    Static,
    /// Zoom from 1.0 toward the cap
    ZoomIn,
    /// Zoom from the cap back toward 1.0
    ZoomOut,
    /// Zoom-in at half rate
    SlowZoomIn,
    /// Crop window sweeps right-to-left at constant zoom
    SlideLeft,
    /// Crop window sweeps left-to-right at constant zoom
    SlideRight,
    /// Slow zoom-in with layered sinusoidal jitter on both axes
    HandheldWalk,
}

impl MotionPrimitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPrimitive::Static => "static",
            MotionPrimitive::ZoomIn => "zoom_in",
            MotionPrimitive::ZoomOut => "zoom_out",
            MotionPrimitive::SlowZoomIn => "slow_zoom_in",
            MotionPrimitive::SlideLeft => "slide_left",
            MotionPrimitive::SlideRight => "slide_right",
            MotionPrimitive::HandheldWalk => "handheld_walk",
        }
    }

    /// Whether this primitive moves the crop window at all.
    pub fn is_static(&self) -> bool {
        matches!(self, MotionPrimitive::Static)
    }
}

impl fmt::Display for MotionPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named cyclic sequence of motion primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectPreset {
    pub id: &'static str,
    pub motion_sequence: &'static [MotionPrimitive],
}

/// Preset id used when an unknown id is requested.
pub const DEFAULT_EFFECT_PRESET: &str = "ken_burns";

/// Immutable preset table, initialized at compile time.
pub const EFFECT_PRESETS: &[EffectPreset] = &[
    EffectPreset {
        id: "ken_burns",
        motion_sequence: &[MotionPrimitive::ZoomIn, MotionPrimitive::ZoomOut],
    },
    EffectPreset {
        id: "drift",
        motion_sequence: &[
            MotionPrimitive::SlideLeft,
            MotionPrimitive::SlowZoomIn,
            MotionPrimitive::SlideRight,
        ],
    },
    EffectPreset {
        id: "documentary",
        motion_sequence: &[
            MotionPrimitive::SlowZoomIn,
            MotionPrimitive::Static,
            MotionPrimitive::SlowZoomIn,
            MotionPrimitive::ZoomOut,
        ],
    },
    EffectPreset {
        id: "handheld",
        motion_sequence: &[MotionPrimitive::HandheldWalk],
    },
    EffectPreset {
        id: "still",
        motion_sequence: &[MotionPrimitive::Static],
    },
];

impl EffectPreset {
    /// Look up a preset by id. Unknown ids fall back to the default preset
    /// rather than erroring, so stored jobs survive preset renames.
    pub fn by_id(id: &str) -> &'static EffectPreset {
        EFFECT_PRESETS
            .iter()
            .find(|p| p.id == id)
            .unwrap_or_else(|| {
                EFFECT_PRESETS
                    .iter()
                    .find(|p| p.id == DEFAULT_EFFECT_PRESET)
                    .expect("default effect preset must exist")
            })
    }

    /// Motion primitive for segment `index`, wrapping cyclically.
    pub fn motion_for(&self, index: usize) -> MotionPrimitive {
        self.motion_sequence[index % self.motion_sequence.len()]
    }
}

impl FromStr for EffectPreset {
    type Err = EffectPresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EFFECT_PRESETS
            .iter()
            .find(|p| p.id == s)
            .copied()
            .ok_or_else(|| EffectPresetParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown effect preset: {0}")]
pub struct EffectPresetParseError(String);

/// Resolve the motion primitive for a (preset id, segment index) pair.
///
/// Pure and stateless; unknown preset ids resolve against the default preset.
pub fn resolve_motion(preset_id: &str, segment_index: usize) -> MotionPrimitive {
    EffectPreset::by_id(preset_id).motion_for(segment_index)
}
