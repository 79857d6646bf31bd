//! Duration allocation across narration lines.
//!
//! The narration audio is generated as one continuous file; each segment's
//! clip must cover its share of the total. Allocation is proportional to the
//! character length of each narration line, which tracks speech time closely
//! enough for slideshow-style assembly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Floor applied when converting an allocated duration into a render
/// duration. Degenerate lines (empty or near-empty) must not collapse into
/// zero-length clips, which FFmpeg rejects.
pub const MIN_CLIP_SECS: f64 = 1.0;

/// Per-segment wall-clock duration plan.
///
/// Invariant: the raw allocated durations sum to the total narration-audio
/// duration within floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DurationPlan {
    durations: Vec<f64>,
    total_secs: f64,
}

impl DurationPlan {
    /// Allocate `total_secs` across `lines` proportional to text length.
    ///
    /// An empty line gets 0.0 and the weighted allocation still sums
    /// correctly. If `lines` is empty or `total_secs` is not positive the
    /// plan is empty/zeroed and the caller decides what to do.
    pub fn allocate(lines: &[&str], total_secs: f64) -> Self {
        if lines.is_empty() || total_secs <= 0.0 {
            return Self {
                durations: vec![0.0; lines.len()],
                total_secs: 0.0,
            };
        }

        let total_chars: usize = lines.iter().map(|l| l.chars().count()).sum();
        if total_chars == 0 {
            // All-empty narration: spread evenly rather than divide by zero.
            let each = total_secs / lines.len() as f64;
            return Self {
                durations: vec![each; lines.len()],
                total_secs,
            };
        }

        let unit = total_secs / total_chars as f64;
        let durations = lines
            .iter()
            .map(|l| l.chars().count() as f64 * unit)
            .collect();

        Self {
            durations,
            total_secs,
        }
    }

    /// Raw allocated duration for segment `index` in seconds.
    pub fn allocated(&self, index: usize) -> Option<f64> {
        self.durations.get(index).copied()
    }

    /// Duration to actually render for segment `index`, with the minimum
    /// floor applied so degenerate lines still produce a visible clip.
    pub fn render_duration(&self, index: usize) -> Option<f64> {
        self.durations.get(index).map(|d| d.max(MIN_CLIP_SECS))
    }

    /// Total narration duration this plan was derived from.
    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Number of segments in the plan.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Iterate over raw allocated durations in segment order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.durations.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_allocation() {
        // 10/20/10 chars over 8 seconds -> 2s/4s/2s
        let lines = ["aaaaaaaaaa", "bbbbbbbbbbbbbbbbbbbb", "cccccccccc"];
        let plan = DurationPlan::allocate(&lines, 8.0);

        assert!((plan.allocated(0).unwrap() - 2.0).abs() < 1e-9);
        assert!((plan.allocated(1).unwrap() - 4.0).abs() < 1e-9);
        assert!((plan.allocated(2).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_equals_total() {
        let lines = ["short", "a much longer narration line here", "mid length one"];
        let plan = DurationPlan::allocate(&lines, 37.31);
        let sum: f64 = plan.iter().sum();
        assert!((sum - 37.31).abs() < 1e-9);
    }

    #[test]
    fn test_empty_line_gets_zero() {
        let lines = ["hello", "", "world"];
        let plan = DurationPlan::allocate(&lines, 10.0);
        assert_eq!(plan.allocated(1), Some(0.0));
        let sum: f64 = plan.iter().sum();
        assert!((sum - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_duration_floor() {
        let lines = ["x", "yyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyy"];
        let plan = DurationPlan::allocate(&lines, 4.0);
        assert!(plan.allocated(0).unwrap() < MIN_CLIP_SECS);
        assert_eq!(plan.render_duration(0), Some(MIN_CLIP_SECS));
    }

    #[test]
    fn test_empty_inputs() {
        let plan = DurationPlan::allocate(&[], 10.0);
        assert!(plan.is_empty());
        assert_eq!(plan.total_secs(), 0.0);

        let plan = DurationPlan::allocate(&["a", "b"], 0.0);
        assert_eq!(plan.allocated(0), Some(0.0));
        assert_eq!(plan.allocated(1), Some(0.0));
    }

    #[test]
    fn test_all_empty_lines_spread_evenly() {
        let plan = DurationPlan::allocate(&["", ""], 6.0);
        assert!((plan.allocated(0).unwrap() - 3.0).abs() < 1e-9);
        assert!((plan.allocated(1).unwrap() - 3.0).abs() < 1e-9);
    }
}
