//! Stage pipelines.
//!
//! Each pipeline loads a manifest, prepares its directories, and fans the
//! entries out over the batch runner. Only manifest, configuration and
//! directory problems are returned as errors; everything item-level ends up
//! in the returned [`RunSummary`].

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::info;

use clipset_media::{ClipTrimmer, FfmpegTrimmer, VideoDownloader, YtDlp};
use clipset_models::{ClipDescriptor, Manifest, ManifestError, RunSummary, SourceDescriptor};

use crate::config::{ClipStageConfig, WorkerConfig};
use crate::error::WorkerResult;
use crate::retry::RetryConfig;
use crate::runner::{BatchRunner, RunProgress};
use crate::tasks::{ClipTask, DownloadTask};

/// Download and clip extraction pipelines sharing one runner.
pub struct Pipeline {
    config: WorkerConfig,
    runner: BatchRunner,
    downloader: Arc<dyn VideoDownloader>,
    trimmer: Arc<dyn ClipTrimmer>,
}

impl Pipeline {
    /// Create a pipeline backed by yt-dlp and FFmpeg.
    pub fn from_config(config: WorkerConfig) -> WorkerResult<Self> {
        let downloader = YtDlp::new()
            .with_program(config.ytdlp_path.clone())
            .with_limit_rate(config.rate_limit())
            .with_timeout(Some(config.download_timeout));
        let trimmer = FfmpegTrimmer::new()
            .with_program(config.ffmpeg_path.clone())
            .with_timeout(config.trim_timeout);

        Self::with_tools(config, Arc::new(downloader), Arc::new(trimmer))
    }

    /// Create a pipeline with caller-supplied tools.
    pub fn with_tools(
        config: WorkerConfig,
        downloader: Arc<dyn VideoDownloader>,
        trimmer: Arc<dyn ClipTrimmer>,
    ) -> WorkerResult<Self> {
        config.validate()?;
        let runner = BatchRunner::new(config.workers)?;

        Ok(Self {
            config,
            runner,
            downloader,
            trimmer,
        })
    }

    /// Publish progress of every stage to a watch channel.
    pub fn with_progress(mut self, progress: watch::Sender<RunProgress>) -> Self {
        self.runner = self.runner.with_progress(progress);
        self
    }

    /// Tag all stages with a run id.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.runner = self.runner.with_run_id(run_id);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Download every distinct source video named in `manifest`.
    pub async fn download_all_videos(
        &self,
        manifest: &Path,
        save_dir: &Path,
    ) -> WorkerResult<RunSummary> {
        let manifest: Manifest<SourceDescriptor> = load_manifest(manifest).await?;
        let (sources, duplicates) = manifest.into_unique_sources();
        if duplicates > 0 {
            info!("Collapsed {} duplicate source URLs", duplicates);
        }

        tokio::fs::create_dir_all(save_dir).await?;

        let retry = RetryConfig::new("download")
            .with_max_attempts(self.config.download_attempts)
            .with_delay(self.config.download_retry_delay);
        let task = Arc::new(DownloadTask::new(
            Arc::clone(&self.downloader),
            save_dir,
            retry,
        ));

        let summary = self
            .runner
            .run("download", sources, move |source| {
                let task = Arc::clone(&task);
                async move { task.run(source).await }
            })
            .await;
        Ok(summary)
    }

    /// Cut every clip in `manifest` from the sources in `input_dir`.
    pub async fn extract_clips(
        &self,
        manifest: &Path,
        input_dir: &Path,
        output_dir: &Path,
        stage: ClipStageConfig,
    ) -> WorkerResult<RunSummary> {
        let manifest: Manifest<ClipDescriptor> = load_manifest(manifest).await?;

        tokio::fs::create_dir_all(output_dir).await?;

        let task = Arc::new(ClipTask::new(
            Arc::clone(&self.trimmer),
            input_dir,
            output_dir,
            stage,
        ));

        let summary = self
            .runner
            .run(stage.stage, manifest.into_descriptors(), move |clip| {
                let task = Arc::clone(&task);
                async move { task.run(clip).await }
            })
            .await;
        Ok(summary)
    }

    /// Extract labelled segments, named `<id>_<start>_<end>.mp4`.
    pub async fn extract_segmented_clips(
        &self,
        manifest: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> WorkerResult<RunSummary> {
        self.extract_clips(manifest, input_dir, output_dir, ClipStageConfig::SEGMENTED)
            .await
    }

    /// Extract continuous spans, named by `clip_name`.
    pub async fn extract_continuous_clips(
        &self,
        manifest: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> WorkerResult<RunSummary> {
        self.extract_clips(manifest, input_dir, output_dir, ClipStageConfig::CONTINUOUS)
            .await
    }
}

async fn load_manifest<T: DeserializeOwned>(path: &Path) -> WorkerResult<Manifest<T>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ManifestError::read(path, e))?;
    let manifest = Manifest::from_json_str(&raw)?;
    info!("Loaded {} manifest entries from {}", manifest.len(), path.display());
    Ok(manifest)
}
