//! FFmpeg CLI wrapper for the Storyreel pipeline.
//!
//! This crate provides:
//! - A command builder and runner with timeout, cancellation and progress
//! - Motion parameter construction and zoompan expression emission
//! - Clip rendering (one still image -> one fixed-duration clip)
//! - Sequence assembly (concat + loudness-normalized audio merge)
//! - Caption burn-in
//! - ffprobe media inspection and filesystem utilities

pub mod assemble;
pub mod burnin;
pub mod command;
pub mod error;
pub mod fs_utils;
pub mod motion;
pub mod probe;
pub mod progress;
pub mod render;

pub use assemble::{concat_clips, merge_narration, LOUDNORM_FILTER};
pub use burnin::burn_captions;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use fs_utils::move_file;
pub use motion::{MotionParams, PanDirection, FRAME_BUFFER, RENDER_FPS};
pub use probe::{probe_duration, probe_video, VideoInfo};
pub use progress::FfmpegProgress;
pub use render::render_clip;
