//! Word-level transcription timestamps.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One transcribed word with its spoken time range.
///
/// Words arrive ordered and non-overlapping by construction of the
/// transcription service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Word {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Word {
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    /// Spoken duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let w = Word::new("hello", 120, 480);
        assert_eq!(w.duration_ms(), 360);
    }

    #[test]
    fn test_duration_saturates() {
        let w = Word::new("odd", 500, 400);
        assert_eq!(w.duration_ms(), 0);
    }
}
