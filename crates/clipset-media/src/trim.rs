//! Clip trimming with FFmpeg.
//!
//! Clips are cut with a stream copy of the video track only: no re-encode,
//! no audio, one FFmpeg thread. Cuts are therefore fast and cheap to run
//! many at a time, at the cost of keyframe-aligned boundaries.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, ProcessRunner};
use crate::error::{MediaError, MediaResult};

/// A single cut.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl TrimRequest {
    /// Check the request before handing it to a tool.
    pub fn validate(&self) -> MediaResult<()> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(MediaError::invalid_request(format!(
                "start offset must be a non-negative number, got {}",
                self.start
            )));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(MediaError::invalid_request(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}

/// Something that can cut a time range out of a video file.
#[async_trait]
pub trait ClipTrimmer: Send + Sync {
    /// Write `request.output` from the requested range of `request.input`.
    async fn trim(&self, request: &TrimRequest) -> MediaResult<()>;
}

/// FFmpeg backed [`ClipTrimmer`].
#[derive(Debug, Clone)]
pub struct FfmpegTrimmer {
    /// Program name or path
    program: String,
    timeout: Option<Duration>,
}

impl Default for FfmpegTrimmer {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            timeout: None,
        }
    }
}

impl FfmpegTrimmer {
    /// Create a trimmer using `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific FFmpeg binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set an optional wall-clock limit per cut.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the FFmpeg command for a cut.
    pub fn command(&self, request: &TrimRequest) -> FfmpegCommand {
        FfmpegCommand::new(&request.input, &request.output)
            .start(request.start)
            .duration(request.duration)
            .video_codec("copy")
            .no_audio()
            .threads(1)
            .log_level("error")
    }
}

#[async_trait]
impl ClipTrimmer for FfmpegTrimmer {
    async fn trim(&self, request: &TrimRequest) -> MediaResult<()> {
        request.validate()?;

        info!(
            "Trimming clip: {} -> {} (start: {:.2}s, duration: {:.2}s)",
            request.input.display(),
            request.output.display(),
            request.start,
            request.duration
        );

        let args = self.command(request).build_args();
        ProcessRunner::new()
            .with_optional_timeout(self.timeout)
            .run(&self.program, &args)
            .await?
            .into_result(&self.program)?;

        debug!("Clip written: {}", request.output.display());
        Ok(())
    }
}
