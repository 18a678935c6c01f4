//! ffprobe/ffmpeg subprocess implementation of [`MediaTool`].

use super::{processing_path, MediaTool, MediaToolError, StreamGeometry};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

// Keep error bodies readable in logs and responses.
const MAX_STDERR_CHARS: usize = 2000;

/// Reject executable paths with shell metacharacters or traversal sequences.
fn validate_executable(tool: &'static str, path: &str) -> Result<(), MediaToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err(MediaToolError::InvalidExecutable {
            tool,
            reason: "path is empty".to_string(),
        });
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(MediaToolError::InvalidExecutable {
            tool,
            reason: format!("'{}' contains dangerous characters", path),
        });
    }
    if path.contains("..") {
        return Err(MediaToolError::InvalidExecutable {
            tool,
            reason: format!("'{}' contains directory traversal", path),
        });
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the first video stream's dimensions from `ffprobe -print_format json` output.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, MediaToolError> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| MediaToolError::Parse(e.to_string()))?;

    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or(MediaToolError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(StreamGeometry { width, height })
        }
        _ => Err(MediaToolError::MissingDimensions),
    }
}

fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.chars().count() > MAX_STDERR_CHARS {
        let mut cut: String = text.chars().take(MAX_STDERR_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Runs `ffprobe` and `ffmpeg` as child processes with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct FfmpegMediaTool {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegMediaTool {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MediaToolError> {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = ffprobe_path.into();
        validate_executable("ffmpeg", &ffmpeg_path)?;
        validate_executable("ffprobe", &ffprobe_path)?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            timeout,
        })
    }

    /// Run a tool to completion. The child is killed if the timeout elapses.
    async fn run(
        &self,
        tool: &'static str,
        program: &str,
        args: Vec<OsString>,
    ) -> Result<Output, MediaToolError> {
        let mut command = Command::new(program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|source| MediaToolError::Spawn { tool, source })?,
            Err(_) => {
                tracing::error!(
                    process.executable.name = tool,
                    timeout_secs = self.timeout.as_secs(),
                    "Media tool timed out"
                );
                return Err(MediaToolError::Timeout {
                    tool,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(MediaToolError::Failed {
                tool,
                status: output.status.to_string(),
                stderr: truncate_stderr(&output.stderr),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaTool for FfmpegMediaTool {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn inspect(&self, path: &Path) -> Result<StreamGeometry, MediaToolError> {
        let start = std::time::Instant::now();

        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(path.as_os_str().to_owned());

        let output = self.run("ffprobe", &self.ffprobe_path, args).await?;
        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux_fast_start(&self, path: &Path) -> Result<PathBuf, MediaToolError> {
        let start = std::time::Instant::now();
        let output_path = processing_path(path);

        let args: Vec<OsString> = vec![
            "-y".into(),
            "-i".into(),
            path.as_os_str().to_owned(),
            "-c".into(),
            "copy".into(),
            "-movflags".into(),
            "faststart".into(),
            "-f".into(),
            "mp4".into(),
            output_path.as_os_str().to_owned(),
        ];

        self.run("ffmpeg", &self.ffmpeg_path, args).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
