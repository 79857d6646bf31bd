//! S3-compatible object storage for Storyreel artifacts.
//!
//! The pipeline consumes storage as "upload bytes at key, get public URL
//! back" and "download URL/key to local path". Keys are namespaced by
//! user, job and segment identity.

pub mod client;
pub mod error;

pub use client::{
    final_video_key, narration_audio_key, segment_image_key, StorageClient, StorageConfig,
};
pub use error::{StorageError, StorageResult};
