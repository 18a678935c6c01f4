//! Upload pipeline for video files and thumbnails.

mod access;
mod orchestrator;

pub use access::load_owned_video;
pub use orchestrator::{UploadOrchestrator, UploadOrchestratorConfig};
