//! Source video download with retries.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use clipset_media::{MediaError, VideoDownloader};
use clipset_models::{Outcome, SourceDescriptor};

use crate::retry::{retry_async, RetryConfig, RetryResult};
use crate::tasks::{find_source, source_candidates};

/// Downloads one source video into the save directory.
pub struct DownloadTask {
    downloader: Arc<dyn VideoDownloader>,
    save_dir: PathBuf,
    retry: RetryConfig,
}

impl DownloadTask {
    pub fn new(
        downloader: Arc<dyn VideoDownloader>,
        save_dir: impl Into<PathBuf>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            downloader,
            save_dir: save_dir.into(),
            retry,
        }
    }

    /// Path the download is requested at.
    pub fn output_path(&self, id: &str) -> PathBuf {
        let [_, requested] = source_candidates(&self.save_dir, id);
        requested
    }

    /// Download `source` unless it is already present.
    pub async fn run(&self, source: SourceDescriptor) -> Outcome {
        let id = match source.identifier() {
            Ok(id) => id,
            Err(e) => return Outcome::error(e.to_string()),
        };

        if let Some(existing) = find_source(&self.save_dir, &id).await {
            debug!("Source {} already present at {}", id, existing.display());
            return Outcome::Skipped;
        }

        let output = self.output_path(&id);
        let result = retry_async(&self.retry, |attempt| {
            let id = id.as_str();
            let output = &output;
            let url = source.url.as_str();
            async move {
                debug!(item = %id, attempt, "Downloading {}", url);
                self.downloader.download(url, output).await
            }
        })
        .await;

        match result {
            RetryResult::Success { attempts, .. } => {
                info!(item = %id, attempts, "Downloaded {}", output.display());
                Outcome::Downloaded
            }
            RetryResult::Failed { error, attempts } => {
                Outcome::failed(failure_reason(&error, attempts))
            }
        }
    }
}

fn failure_reason(error: &MediaError, attempts: u32) -> String {
    format!(
        "download failed after {} attempt{}: {}",
        attempts,
        if attempts == 1 { "" } else { "s" },
        error.diagnostic()
    )
}
