//! Media inspection and remuxing.
//!
//! The pipeline talks to external media binaries only through [`MediaTool`], so tests
//! can substitute canned geometry and output without running ffmpeg.

mod ffmpeg;

pub use ffmpeg::FfmpegMediaTool;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tubely_core::models::Orientation;
use tubely_core::AppError;

/// Dimensions of the first video stream of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

impl StreamGeometry {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_dimensions(self.width, self.height)
    }
}

#[derive(Debug, Error)]
pub enum MediaToolError {
    #[error("Invalid {tool} path: {reason}")]
    InvalidExecutable { tool: &'static str, reason: String },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: &'static str, secs: u64 },

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(String),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Video stream has no usable dimensions")]
    MissingDimensions,
}

impl From<MediaToolError> for AppError {
    fn from(err: MediaToolError) -> Self {
        match err {
            MediaToolError::NoVideoStream | MediaToolError::MissingDimensions => {
                AppError::MediaData(err.to_string())
            }
            other => AppError::ExternalTool(other.to_string()),
        }
    }
}

/// Capability to inspect and fast-start remux a video file.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Read the dimensions of the first video stream of `path`.
    async fn inspect(&self, path: &Path) -> Result<StreamGeometry, MediaToolError>;

    /// Rewrite `path` with its index atoms first, without re-encoding.
    ///
    /// The output is written next to the input as `{path}.processing` and its path returned.
    async fn remux_fast_start(&self, path: &Path) -> Result<PathBuf, MediaToolError>;
}

/// Path the remuxer writes its output to.
pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".processing");
    PathBuf::from(name)
}
