//! Motion parameter construction for still-image camera moves.
//!
//! Each motion primitive maps to a small set of typed parameters (zoom rate,
//! zoom cap, pan direction, jitter amplitudes). The math lives here as plain
//! Rust (`zoom_at`, `pan_progress_at`) so it is unit-testable, and
//! `zoompan_expr` emits the equivalent FFmpeg expression strings.

use sreel_models::MotionPrimitive;

/// Output frame rate for rendered clips.
pub const RENDER_FPS: u32 = 30;

/// Extra frames appended to every clip to absorb rounding at concatenation.
pub const FRAME_BUFFER: u32 = 2;

/// Maximum zoom factor for zooming primitives.
pub const ZOOM_CAP: f64 = 1.5;

/// Per-frame zoom increment for the standard zoom primitives.
pub const ZOOM_RATE: f64 = 0.0016;

/// Constant zoom held during slide primitives so the crop window has room
/// to sweep.
pub const SLIDE_ZOOM: f64 = 1.2;

/// Horizontal sweep direction for slide primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    /// Crop window stays horizontally centered.
    Center,
    /// Window starts at the right edge and sweeps to the left edge.
    Left,
    /// Window starts at the left edge and sweeps to the right edge.
    Right,
}

/// Sinusoidal jitter layered on top of the crop window position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    /// Amplitude of the slow sway component, in source pixels.
    pub sway_px: f64,
    /// Amplitude of the fast shake component, in source pixels.
    pub shake_px: f64,
    /// Period of the slow component, in frames.
    pub sway_period: f64,
    /// Period of the fast component, in frames.
    pub shake_period: f64,
}

/// Typed pan/zoom parameters for one rendered clip.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionParams {
    /// Total output frames including the rounding buffer.
    pub frames: u32,
    /// Zoom factor at frame 0.
    pub zoom_start: f64,
    /// Signed per-frame zoom delta.
    pub zoom_rate: f64,
    /// Zoom is clamped into [1.0, ZOOM_CAP].
    pub zoom_cap: f64,
    pub pan: PanDirection,
    pub jitter: Option<Jitter>,
}

impl MotionParams {
    /// Number of output frames for a clip of `duration_secs`.
    pub fn frame_count(duration_secs: f64) -> u32 {
        (duration_secs * RENDER_FPS as f64).ceil() as u32 + FRAME_BUFFER
    }

    /// Build parameters for a motion primitive.
    ///
    /// Returns `None` for `Static`: a static clip is a plain scale/pad with
    /// no pan/zoom pass.
    pub fn for_primitive(primitive: MotionPrimitive, duration_secs: f64) -> Option<Self> {
        let frames = Self::frame_count(duration_secs);
        match primitive {
            MotionPrimitive::Static => None,
            MotionPrimitive::ZoomIn => Some(Self {
                frames,
                zoom_start: 1.0,
                zoom_rate: ZOOM_RATE,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Center,
                jitter: None,
            }),
            MotionPrimitive::ZoomOut => Some(Self {
                frames,
                zoom_start: ZOOM_CAP,
                zoom_rate: -ZOOM_RATE,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Center,
                jitter: None,
            }),
            MotionPrimitive::SlowZoomIn => Some(Self {
                frames,
                zoom_start: 1.0,
                zoom_rate: ZOOM_RATE / 2.0,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Center,
                jitter: None,
            }),
            MotionPrimitive::SlideLeft => Some(Self {
                frames,
                zoom_start: SLIDE_ZOOM,
                zoom_rate: 0.0,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Left,
                jitter: None,
            }),
            MotionPrimitive::SlideRight => Some(Self {
                frames,
                zoom_start: SLIDE_ZOOM,
                zoom_rate: 0.0,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Right,
                jitter: None,
            }),
            MotionPrimitive::HandheldWalk => Some(Self {
                frames,
                zoom_start: 1.05,
                zoom_rate: ZOOM_RATE / 2.0,
                zoom_cap: ZOOM_CAP,
                pan: PanDirection::Center,
                jitter: Some(Jitter {
                    sway_px: 14.0,
                    shake_px: 4.0,
                    sway_period: 47.0,
                    shake_period: 13.0,
                }),
            }),
        }
    }

    /// Zoom factor at output frame `n`. Mirrors the emitted expression.
    pub fn zoom_at(&self, n: u32) -> f64 {
        (self.zoom_start + self.zoom_rate * n as f64).clamp(1.0, self.zoom_cap)
    }

    /// Horizontal sweep progress in [0, 1] at frame `n` for slides.
    pub fn pan_progress_at(&self, n: u32) -> f64 {
        if self.frames <= 1 {
            return 0.0;
        }
        let t = n as f64 / (self.frames - 1) as f64;
        match self.pan {
            PanDirection::Center => 0.5,
            PanDirection::Right => t.min(1.0),
            PanDirection::Left => (1.0 - t).max(0.0),
        }
    }

    /// Emit the zoompan z/x/y expressions for this parameter set.
    ///
    /// `on` is the zoompan output frame counter; `iw`/`ih` the (pre-scaled)
    /// input dimensions, `zoom` the current factor.
    pub fn zoompan_expr(&self) -> ZoompanExpr {
        let z = if self.zoom_rate > 0.0 {
            format!(
                "min({:.4}+{:.6}*on,{:.4})",
                self.zoom_start, self.zoom_rate, self.zoom_cap
            )
        } else if self.zoom_rate < 0.0 {
            format!(
                "max({:.4}-{:.6}*on,1.0)",
                self.zoom_start,
                self.zoom_rate.abs()
            )
        } else {
            format!("{:.4}", self.zoom_start)
        };

        let denom = (self.frames.max(2) - 1) as f64;
        let base_x = match self.pan {
            PanDirection::Center => "iw/2-(iw/zoom/2)".to_string(),
            PanDirection::Right => format!("(iw-iw/zoom)*(on/{:.1})", denom),
            PanDirection::Left => format!("(iw-iw/zoom)*(1-on/{:.1})", denom),
        };
        let base_y = "ih/2-(ih/zoom/2)".to_string();

        let (x, y) = match &self.jitter {
            None => (base_x, base_y),
            Some(j) => (
                format!(
                    "{}+{:.1}*sin(on/{:.1})+{:.1}*sin(on/{:.1})",
                    base_x, j.sway_px, j.sway_period, j.shake_px, j.shake_period
                ),
                format!(
                    "{}+{:.1}*cos(on/{:.1})+{:.1}*cos(on/{:.1})",
                    base_y, j.sway_px, j.sway_period, j.shake_px, j.shake_period
                ),
            ),
        };

        ZoompanExpr { z, x, y }
    }
}

/// The three zoompan expressions for one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoompanExpr {
    pub z: String,
    pub x: String,
    pub y: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_includes_buffer() {
        // 4.0s at 30fps = 120 frames + buffer
        assert_eq!(MotionParams::frame_count(4.0), 120 + FRAME_BUFFER);
        // Fractional durations round up
        assert_eq!(MotionParams::frame_count(1.01), 31 + FRAME_BUFFER);
    }

    #[test]
    fn test_zoom_in_ramps_and_caps() {
        let p = MotionParams::for_primitive(MotionPrimitive::ZoomIn, 60.0).unwrap();
        assert!((p.zoom_at(0) - 1.0).abs() < 1e-9);
        assert!(p.zoom_at(100) > p.zoom_at(50));
        // Long clip saturates at the cap
        assert!((p.zoom_at(p.frames) - ZOOM_CAP).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_out_mirrors_zoom_in() {
        let zin = MotionParams::for_primitive(MotionPrimitive::ZoomIn, 10.0).unwrap();
        let zout = MotionParams::for_primitive(MotionPrimitive::ZoomOut, 10.0).unwrap();
        assert!((zout.zoom_at(0) - ZOOM_CAP).abs() < 1e-9);
        assert!(zout.zoom_at(100) < zout.zoom_at(50));
        assert!((zin.zoom_rate + zout.zoom_rate).abs() < 1e-12);
    }

    #[test]
    fn test_slow_zoom_is_half_rate() {
        let fast = MotionParams::for_primitive(MotionPrimitive::ZoomIn, 5.0).unwrap();
        let slow = MotionParams::for_primitive(MotionPrimitive::SlowZoomIn, 5.0).unwrap();
        assert!((slow.zoom_rate - fast.zoom_rate / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_slides_hold_zoom_and_sweep_edge_to_edge() {
        let right = MotionParams::for_primitive(MotionPrimitive::SlideRight, 3.0).unwrap();
        assert_eq!(right.zoom_rate, 0.0);
        assert!((right.pan_progress_at(0) - 0.0).abs() < 1e-9);
        assert!((right.pan_progress_at(right.frames - 1) - 1.0).abs() < 1e-9);

        let left = MotionParams::for_primitive(MotionPrimitive::SlideLeft, 3.0).unwrap();
        assert!((left.pan_progress_at(0) - 1.0).abs() < 1e-9);
        assert!((left.pan_progress_at(left.frames - 1) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_handheld_has_jitter_atop_slow_zoom() {
        let p = MotionParams::for_primitive(MotionPrimitive::HandheldWalk, 5.0).unwrap();
        assert!(p.jitter.is_some());
        assert!(p.zoom_rate > 0.0);
        let expr = p.zoompan_expr();
        assert!(expr.x.contains("sin"));
        assert!(expr.y.contains("cos"));
    }

    #[test]
    fn test_static_has_no_params() {
        assert!(MotionParams::for_primitive(MotionPrimitive::Static, 2.0).is_none());
    }

    #[test]
    fn test_expr_shapes() {
        let p = MotionParams::for_primitive(MotionPrimitive::ZoomIn, 4.0).unwrap();
        let expr = p.zoompan_expr();
        assert!(expr.z.starts_with("min("));
        assert!(expr.z.contains("*on"));
        assert_eq!(expr.x, "iw/2-(iw/zoom/2)");

        let p = MotionParams::for_primitive(MotionPrimitive::ZoomOut, 4.0).unwrap();
        assert!(p.zoompan_expr().z.starts_with("max("));

        let p = MotionParams::for_primitive(MotionPrimitive::SlideRight, 4.0).unwrap();
        assert!(p.zoompan_expr().x.contains("(iw-iw/zoom)"));
    }
}
