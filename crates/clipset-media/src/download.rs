//! Video download using yt-dlp.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::ProcessRunner;
use crate::error::MediaResult;

/// Default outbound rate cap passed to yt-dlp.
pub const DEFAULT_RATE_LIMIT: &str = "100M";

/// Default wall-clock limit for one download attempt.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Something that can fetch a source video to a local path.
///
/// One call is one attempt; retry policy belongs to the caller.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download `url` to `output`.
    async fn download(&self, url: &str, output: &Path) -> MediaResult<()>;
}

/// Builder for yt-dlp commands.
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    url: String,
    output: PathBuf,
    limit_rate: Option<String>,
}

impl YtDlpCommand {
    /// Create a new yt-dlp command.
    pub fn new(url: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            output: output.as_ref().to_path_buf(),
            limit_rate: None,
        }
    }

    /// Cap the download rate (yt-dlp syntax, e.g. "100M").
    pub fn limit_rate(mut self, rate: impl Into<String>) -> Self {
        self.limit_rate = Some(rate.into());
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["--no-progress".to_string()];

        if let Some(rate) = &self.limit_rate {
            args.push("--limit-rate".to_string());
            args.push(rate.clone());
        }

        args.push("-o".to_string());
        args.push(self.output.to_string_lossy().to_string());
        args.push(self.url.clone());

        args
    }
}

/// yt-dlp backed [`VideoDownloader`].
#[derive(Debug, Clone)]
pub struct YtDlp {
    /// Program name or path
    program: String,
    limit_rate: Option<String>,
    timeout: Option<Duration>,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            limit_rate: Some(DEFAULT_RATE_LIMIT.to_string()),
            timeout: Some(DEFAULT_DOWNLOAD_TIMEOUT),
        }
    }
}

impl YtDlp {
    /// Create a downloader with the default rate cap and timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific yt-dlp binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the rate cap, or `None` for unlimited.
    pub fn with_limit_rate(mut self, rate: Option<String>) -> Self {
        self.limit_rate = rate;
        self
    }

    /// Set the per-attempt timeout, or `None` to wait indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the command for a download.
    pub fn command(&self, url: &str, output: &Path) -> YtDlpCommand {
        let cmd = YtDlpCommand::new(url, output);
        match &self.limit_rate {
            Some(rate) => cmd.limit_rate(rate.clone()),
            None => cmd,
        }
    }
}

#[async_trait]
impl VideoDownloader for YtDlp {
    async fn download(&self, url: &str, output: &Path) -> MediaResult<()> {
        info!(url = %url, output = %output.display(), "Downloading video");

        let args = self.command(url, output).build_args();
        let result = ProcessRunner::new()
            .with_optional_timeout(self.timeout)
            .run(&self.program, &args)
            .await?
            .into_result(&self.program)?;

        debug!("yt-dlp finished: {}", result.stdout.lines().last().unwrap_or(""));
        Ok(())
    }
}
