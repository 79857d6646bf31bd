//! Caption burn-in: composite a subtitle script into video pixels.

use std::path::Path;
use tracing::info;

use sreel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Burn a caption script into the video pixels.
///
/// The audio stream is copied unchanged; the video stream gets a fast,
/// quality-appropriate re-encode. A non-zero exit here is fatal to
/// compositing only; callers fall back to the uncaptioned video.
pub async fn burn_captions(
    video: impl AsRef<Path>,
    script: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let video = video.as_ref();
    let script = script.as_ref();
    let output = output.as_ref();

    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }
    if !script.exists() {
        return Err(MediaError::FileNotFound(script.to_path_buf()));
    }

    info!(
        "Burning captions: {} + {} -> {}",
        video.display(),
        script.display(),
        output.display()
    );

    let cmd = FfmpegCommand::new(video, output)
        .video_filter(format!("ass={}", escape_filter_path(script)))
        .video_codec("libx264")
        .preset(encoding.preset.clone())
        .crf(encoding.crf)
        .audio_codec("copy");

    runner.run(&cmd).await?;
    Ok(())
}

/// Escape a path for use inside an FFmpeg filter argument.
///
/// Filter strings treat `:` and `'` specially, and on Windows-style paths the
/// drive colon would otherwise split the option.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_path() {
        assert_eq!(
            escape_filter_path(Path::new("/tmp/job/captions.ass")),
            "/tmp/job/captions.ass"
        );
    }

    #[test]
    fn test_escape_colon() {
        assert_eq!(
            escape_filter_path(Path::new("/tmp/a:b.ass")),
            "/tmp/a\\:b.ass"
        );
    }
}
