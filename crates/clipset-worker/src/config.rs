//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clipset_media::download::{DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_RATE_LIMIT};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum items processed concurrently
    pub workers: usize,
    /// Total download attempts per video (first try included)
    pub download_attempts: u32,
    /// Fixed pause between download attempts
    pub download_retry_delay: Duration,
    /// Wall-clock limit for one download attempt
    pub download_timeout: Duration,
    /// yt-dlp rate cap (empty disables it)
    pub download_rate_limit: String,
    /// yt-dlp binary
    pub ytdlp_path: String,
    /// FFmpeg binary
    pub ffmpeg_path: String,
    /// Optional wall-clock limit for one cut
    pub trim_timeout: Option<Duration>,
    /// Prometheus text file written when the run ends
    pub metrics_file: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            download_attempts: 3,
            download_retry_delay: Duration::from_secs(2),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            download_rate_limit: DEFAULT_RATE_LIMIT.to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            trim_timeout: None,
            metrics_file: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            workers: env_or("CLIPSET_WORKERS", defaults.workers),
            download_attempts: env_or("CLIPSET_DOWNLOAD_ATTEMPTS", defaults.download_attempts),
            download_retry_delay: Duration::from_secs(env_or(
                "CLIPSET_DOWNLOAD_RETRY_DELAY_SECS",
                defaults.download_retry_delay.as_secs(),
            )),
            download_timeout: Duration::from_secs(env_or(
                "CLIPSET_DOWNLOAD_TIMEOUT_SECS",
                defaults.download_timeout.as_secs(),
            )),
            download_rate_limit: std::env::var("CLIPSET_DOWNLOAD_RATE_LIMIT")
                .unwrap_or(defaults.download_rate_limit),
            ytdlp_path: std::env::var("CLIPSET_YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ffmpeg_path: std::env::var("CLIPSET_FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            trim_timeout: std::env::var("CLIPSET_TRIM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            metrics_file: std::env::var_os("CLIPSET_METRICS_FILE").map(PathBuf::from),
        }
    }

    /// Reject settings the runner cannot work with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.workers == 0 {
            return Err(WorkerError::config_error("workers must be at least 1"));
        }
        if self.download_attempts == 0 {
            return Err(WorkerError::config_error(
                "download attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Rate cap to pass to yt-dlp, if any.
    pub fn rate_limit(&self) -> Option<String> {
        let rate = self.download_rate_limit.trim();
        (!rate.is_empty()).then(|| rate.to_string())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// How clip output files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipNaming {
    /// `<id>_<start>_<end>.mp4`, start and end truncated to whole seconds
    Segmented,
    /// `<clip_name>.mp4`, falling back to `<id>.mp4`
    Continuous,
}

/// Per-stage settings for clip extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipStageConfig {
    /// Stage name used in logs and summaries
    pub stage: &'static str,
    pub naming: ClipNaming,
    /// Skip clips whose output file already exists
    pub skip_existing: bool,
}

impl ClipStageConfig {
    /// One clip per labelled segment.
    pub const SEGMENTED: Self = Self {
        stage: "segmented",
        naming: ClipNaming::Segmented,
        skip_existing: true,
    };

    /// One clip per continuous span, named by the manifest.
    pub const CONTINUOUS: Self = Self {
        stage: "continuous",
        naming: ClipNaming::Continuous,
        skip_existing: true,
    };

    /// Set whether existing outputs are skipped.
    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }
}
