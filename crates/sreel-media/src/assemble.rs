//! Sequence assembly: ordered clip concatenation and narration merge.

use std::path::Path;
use tracing::info;

use sreel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Loudness normalization applied to the narration track on merge.
///
/// Generated narration varies wildly in level across voices; a fixed
/// integrated target with a true-peak ceiling keeps output consistent across
/// jobs and safe from clipping under downstream re-encoding.
pub const LOUDNORM_FILTER: &str = "loudnorm=I=-16:TP=-1.5:LRA=11";

/// Concatenate ordered clips losslessly into one silent video.
///
/// Uses the concat demuxer with stream copy; all clips come from the same
/// renderer so their parameters match. The list file is written next to the
/// output and owned by the job's working directory.
pub async fn concat_clips(
    clips: &[impl AsRef<Path>],
    output: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let output = output.as_ref();

    if clips.is_empty() {
        return Err(MediaError::internal("No clips to concatenate"));
    }
    for clip in clips {
        let clip = clip.as_ref();
        if !clip.exists() {
            return Err(MediaError::FileNotFound(clip.to_path_buf()));
        }
    }

    let list_path = output.with_extension("concat.txt");
    let mut list = String::new();
    for clip in clips {
        // Concat demuxer quoting: single-quote wrapped, embedded quotes escaped.
        let escaped = clip.as_ref().to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    tokio::fs::write(&list_path, list).await?;

    info!(
        "Concatenating {} clips -> {}",
        clips.len(),
        output.display()
    );

    let cmd = FfmpegCommand::new(&list_path, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .output_arg("-c")
        .output_arg("copy");

    runner.run(&cmd).await?;

    tokio::fs::remove_file(&list_path).await.ok();
    Ok(())
}

/// Merge the silent visual track with the narration audio.
///
/// The narration is loudness-normalized and encoded to AAC; the video stream
/// is copied untouched. Output is trimmed to the shorter stream so the small
/// per-clip frame buffer never pads the end with silence.
pub async fn merge_narration(
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let video = video.as_ref();
    let audio = audio.as_ref();
    let output = output.as_ref();

    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }
    if !audio.exists() {
        return Err(MediaError::FileNotFound(audio.to_path_buf()));
    }

    info!(
        "Merging narration: {} + {} -> {}",
        video.display(),
        audio.display(),
        output.display()
    );

    let cmd = FfmpegCommand::new(video, output)
        .input(audio)
        .output_args(["-map", "0:v:0", "-map", "1:a:0"])
        .video_codec("copy")
        .audio_codec("aac")
        .audio_bitrate(encoding.audio_bitrate.clone())
        .audio_filter(LOUDNORM_FILTER)
        .shortest();

    runner.run(&cmd).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_concat_rejects_empty_input() {
        let runner = FfmpegRunner::new();
        let clips: Vec<&Path> = vec![];
        let err = concat_clips(&clips, Path::new("/tmp/out.mp4"), &runner)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Internal(_)));
    }

    #[tokio::test]
    async fn test_concat_rejects_missing_clip() {
        let runner = FfmpegRunner::new();
        let clips = vec![Path::new("/nonexistent/clip_000.mp4")];
        let err = concat_clips(&clips, Path::new("/tmp/out.mp4"), &runner)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[test]
    fn test_loudnorm_filter_targets() {
        assert!(LOUDNORM_FILTER.contains("I=-16"));
        assert!(LOUDNORM_FILTER.contains("TP=-1.5"));
        assert!(LOUDNORM_FILTER.contains("LRA=11"));
    }
}
