//! Tubely Processing Library
//!
//! The upload pipeline: buffering request bodies to private temp storage, inspecting
//! and remuxing video through ffprobe/ffmpeg, and publishing the result.
//!
//! # Modules
//!
//! - `media` - the [`MediaTool`] capability and its ffmpeg implementation
//! - `upload` - the [`UploadOrchestrator`] driving video and thumbnail uploads

pub mod media;
pub mod upload;

pub use media::{FfmpegMediaTool, MediaTool, MediaToolError, StreamGeometry};
pub use upload::{load_owned_video, UploadOrchestrator, UploadOrchestratorConfig};
