//! Video generation worker.
//!
//! This crate provides:
//! - The pipeline orchestrator for generation jobs
//! - Credit precondition, charge, and compensation handling
//! - Clip rendering fan-out and upload
//! - Graceful shutdown

pub mod config;
pub mod credits;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod request;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use pipeline::PipelineContext;
pub use request::{min_viable_segments, GenerationRequest, SegmentSource};
