//! Clip rendering: one still image to one fixed-duration motion clip.

use std::path::Path;
use tracing::{info, trace};

use sreel_models::{EncodingConfig, MotionPrimitive};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::motion::{MotionParams, RENDER_FPS};

/// Render a fixed-duration clip from a still image.
///
/// Non-static primitives pre-scale the image to roughly double the output
/// resolution for zoom quality headroom, then apply a parametric pan/zoom
/// pass. A non-zero FFmpeg exit is fatal for the clip and propagates; retry
/// policy lives with the orchestrator, not here.
pub async fn render_clip(
    image: impl AsRef<Path>,
    output: impl AsRef<Path>,
    duration_secs: f64,
    motion: MotionPrimitive,
    frame_size: (u32, u32),
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let image = image.as_ref();
    let output = output.as_ref();

    if !image.exists() {
        return Err(MediaError::FileNotFound(image.to_path_buf()));
    }
    if duration_secs <= 0.0 {
        return Err(MediaError::internal(format!(
            "Non-positive clip duration: {duration_secs}"
        )));
    }

    info!(
        "Rendering clip: {} -> {} ({:.2}s, motion: {})",
        image.display(),
        output.display(),
        duration_secs,
        motion
    );

    let (width, height) = frame_size;
    let filter = build_motion_filter(motion, duration_secs, frame_size);

    let cmd = match motion {
        MotionPrimitive::Static => FfmpegCommand::new(image, output)
            .loop_input()
            .duration(duration_secs)
            .video_filter(filter),
        _ => {
            let frames = MotionParams::frame_count(duration_secs);
            FfmpegCommand::new(image, output)
                .video_filter(filter)
                .output_arg("-frames:v")
                .output_arg(frames.to_string())
        }
    };

    let cmd = cmd
        .video_codec("libx264")
        .preset(encoding.preset.clone())
        .crf(encoding.crf)
        .output_arg("-pix_fmt")
        .output_arg("yuv420p")
        .output_arg("-an");

    let total_ms = (duration_secs * 1000.0) as i64;
    let clip = output.display().to_string();
    runner
        .run_with_progress(&cmd, move |p| {
            trace!("{}: {:.0}% rendered", clip, p.percentage(total_ms));
        })
        .await?;

    info!("Clip rendered: {} ({}x{})", output.display(), width, height);
    Ok(())
}

/// Build the full video filter chain for one clip.
pub fn build_motion_filter(
    motion: MotionPrimitive,
    duration_secs: f64,
    frame_size: (u32, u32),
) -> String {
    let (w, h) = frame_size;

    match MotionParams::for_primitive(motion, duration_secs) {
        None => {
            // Static: scale into the output box, pad, fix the sample ratio.
            format!(
                "scale={w}:{h}:force_original_aspect_ratio=decrease,\
                 pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={RENDER_FPS}"
            )
        }
        Some(params) => {
            let expr = params.zoompan_expr();
            // Pre-scale to ~2x output for zoom headroom; -2 keeps it even.
            format!(
                "scale={pre_w}:-2,zoompan=z='{z}':x='{x}':y='{y}':d={frames}:s={w}x{h}:fps={fps},setsar=1",
                pre_w = w * 2,
                z = expr.z,
                x = expr.x,
                y = expr.y,
                frames = params.frames,
                fps = RENDER_FPS,
            )
        }
    }
}
