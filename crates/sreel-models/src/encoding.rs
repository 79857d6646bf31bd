//! Video/audio encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Encoding parameters shared by clip rendering and caption burn-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Output frame rate.
    pub fps: u32,
    /// x264 CRF quality (lower is better).
    pub crf: u8,
    /// x264 speed preset.
    pub preset: String,
    /// AAC audio bitrate.
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            crf: 23,
            preset: "veryfast".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_30fps() {
        assert_eq!(EncodingConfig::default().fps, 30);
    }
}
