//! Clip dataset builder binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, Instrument};
use uuid::Uuid;

use clipset_media::check_tool;
use clipset_models::RunSummary;
use clipset_worker::logging::init_tracing;
use clipset_worker::metrics;
use clipset_worker::{Pipeline, RunProgress, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "clipset")]
#[command(about = "Download source videos and cut them into a clip dataset", long_about = None)]
struct Cli {
    /// Maximum number of items processed at once (overrides CLIPSET_WORKERS)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Write Prometheus metrics to this file when the run ends
    /// (overrides CLIPSET_METRICS_FILE)
    #[arg(long, global = true)]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every source video named in a manifest
    Download {
        #[arg(long)]
        manifest: PathBuf,
        /// Directory downloads are written to
        #[arg(long, default_value = "./data/raw")]
        save_dir: PathBuf,
    },
    /// Cut labelled segments into <id>_<start>_<end>.mp4
    Segmented(ClipArgs),
    /// Cut continuous spans into <clip_name>.mp4
    Continuous(ClipArgs),
    /// Download, then extract segmented and continuous clips
    All {
        #[arg(long, default_value = "./data/manifest/mlb-youtube-segmented.json")]
        segmented_manifest: PathBuf,
        #[arg(long, default_value = "./data/manifest/mlb-youtube-continuous.json")]
        continuous_manifest: PathBuf,
        #[arg(long, default_value = "./data/raw")]
        raw_dir: PathBuf,
        #[arg(long, default_value = "./data/segmented")]
        segmented_dir: PathBuf,
        #[arg(long, default_value = "./data/continuous")]
        continuous_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ClipArgs {
    #[arg(long)]
    manifest: PathBuf,
    /// Directory holding downloaded source videos
    #[arg(long, default_value = "./data/raw")]
    input_dir: PathBuf,
    /// Directory clips are written to
    #[arg(long)]
    output_dir: PathBuf,
}

impl Command {
    fn needs_downloader(&self) -> bool {
        matches!(self, Command::Download { .. } | Command::All { .. })
    }

    fn needs_trimmer(&self) -> bool {
        !matches!(self, Command::Download { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = WorkerConfig::from_env();
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(path) = cli.metrics_file {
        config.metrics_file = Some(path);
    }
    info!("Worker config: {:?}", config);

    if cli.command.needs_downloader() {
        check_tool(&config.ytdlp_path).context("yt-dlp is required for downloads")?;
    }
    if cli.command.needs_trimmer() {
        check_tool(&config.ffmpeg_path).context("FFmpeg is required for clip extraction")?;
    }

    let prometheus = match &config.metrics_file {
        Some(path) => Some((metrics::install_prometheus()?, path.clone())),
        None => None,
    };

    let run_id = Uuid::new_v4().to_string();
    let (progress_tx, progress_rx) = watch::channel(RunProgress::default());
    let pipeline = Pipeline::from_config(config)
        .context("invalid worker configuration")?
        .with_run_id(run_id.clone())
        .with_progress(progress_tx);

    let progress_handle = tokio::spawn(log_progress(progress_rx));

    let span = tracing::info_span!("run", run_id = %run_id);
    let result = run(&pipeline, cli.command).instrument(span).await;

    progress_handle.abort();

    if let Some((handle, path)) = prometheus {
        metrics::write_snapshot(&handle, &path)
            .await
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }

    result
}

async fn run(pipeline: &Pipeline, command: Command) -> Result<()> {
    match command {
        Command::Download { manifest, save_dir } => {
            let summary = pipeline.download_all_videos(&manifest, &save_dir).await?;
            print_summary(&summary)?;
        }
        Command::Segmented(args) => {
            let summary = pipeline
                .extract_segmented_clips(&args.manifest, &args.input_dir, &args.output_dir)
                .await?;
            print_summary(&summary)?;
        }
        Command::Continuous(args) => {
            let summary = pipeline
                .extract_continuous_clips(&args.manifest, &args.input_dir, &args.output_dir)
                .await?;
            print_summary(&summary)?;
        }
        Command::All {
            segmented_manifest,
            continuous_manifest,
            raw_dir,
            segmented_dir,
            continuous_dir,
        } => {
            let downloads = pipeline
                .download_all_videos(&segmented_manifest, &raw_dir)
                .await?;
            print_summary(&downloads)?;

            let segmented = pipeline
                .extract_segmented_clips(&segmented_manifest, &raw_dir, &segmented_dir)
                .await?;
            print_summary(&segmented)?;

            let continuous = pipeline
                .extract_continuous_clips(&continuous_manifest, &raw_dir, &continuous_dir)
                .await?;
            print_summary(&continuous)?;
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

async fn log_progress(mut rx: watch::Receiver<RunProgress>) {
    let mut last_step: Option<(String, usize)> = None;

    while rx.changed().await.is_ok() {
        let progress = rx.borrow_and_update().clone();
        if progress.total == 0 {
            continue;
        }

        // Report in tenths; the runner already logs every item.
        let step = progress.completed * 10 / progress.total;
        let key = (progress.stage.clone(), step);
        if last_step.as_ref() != Some(&key) {
            info!(
                stage = %progress.stage,
                "Progress: {}/{} ({}%)",
                progress.completed,
                progress.total,
                step * 10
            );
            last_step = Some(key);
        }
    }
}
