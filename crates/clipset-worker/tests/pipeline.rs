//! End-to-end pipeline runs with in-process fake tools.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use clipset_media::{ClipTrimmer, MediaError, MediaResult, TrimRequest, VideoDownloader};
use clipset_models::OutcomeKind;
use clipset_worker::{Pipeline, RunProgress, WorkerConfig};

/// Writes the merged file yt-dlp would produce; fails for URLs containing "broken".
#[derive(Default)]
struct FakeDownloader {
    calls: AtomicUsize,
}

#[async_trait]
impl VideoDownloader for FakeDownloader {
    async fn download(&self, url: &str, output: &Path) -> MediaResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            return Err(MediaError::tool_failed(
                "yt-dlp",
                "exited with status 1",
                Some("ERROR: Video unavailable".to_string()),
                Some(1),
            ));
        }
        let merged = PathBuf::from(format!("{}.mp4", output.display()));
        tokio::fs::write(merged, b"video").await?;
        Ok(())
    }
}

#[derive(Default)]
struct FakeTrimmer {
    calls: AtomicUsize,
}

#[async_trait]
impl ClipTrimmer for FakeTrimmer {
    async fn trim(&self, request: &TrimRequest) -> MediaResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(&request.output, b"clip").await?;
        Ok(())
    }
}

struct Harness {
    dir: tempfile::TempDir,
    downloader: Arc<FakeDownloader>,
    trimmer: Arc<FakeTrimmer>,
    pipeline: Pipeline,
}

impl Harness {
    fn new() -> Self {
        let config = WorkerConfig {
            workers: 4,
            download_retry_delay: Duration::from_millis(1),
            ..Default::default()
        };
        let downloader = Arc::new(FakeDownloader::default());
        let trimmer = Arc::new(FakeTrimmer::default());
        let pipeline = Pipeline::with_tools(
            config,
            Arc::clone(&downloader) as Arc<dyn VideoDownloader>,
            Arc::clone(&trimmer) as Arc<dyn ClipTrimmer>,
        )
        .unwrap();

        Self {
            dir: tempfile::tempdir().unwrap(),
            downloader,
            trimmer,
            pipeline,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_manifest(&self, name: &str, json: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, json).unwrap();
        path
    }
}

const SEGMENTED: &str = r#"{
    "a": {"url": "https://www.youtube.com/watch?v=AAA", "start": 10, "end": 15, "labels": ["ball"]},
    "b": {"url": "https://www.youtube.com/watch?v=AAA", "start": 20.5, "end": 31.9},
    "c": {"url": "https://www.youtube.com/watch?v=BBB", "start": 0, "end": 4},
    "d": {"url": "https://www.youtube.com/watch?v=CCC", "start": 7, "end": 3}
}"#;

#[tokio::test]
async fn test_download_dedups_and_is_idempotent() {
    let h = Harness::new();
    let manifest = h.write_manifest("segmented.json", SEGMENTED);
    let raw = h.path("raw");

    let first = h.pipeline.download_all_videos(&manifest, &raw).await.unwrap();
    assert_eq!(first.total(), 3);
    assert_eq!(first.count(OutcomeKind::Downloaded), 3);
    assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 3);
    assert!(raw.join("AAA.mkv.mp4").exists());

    let second = h.pipeline.download_all_videos(&manifest, &raw).await.unwrap();
    assert_eq!(second.count(OutcomeKind::Skipped), 3);
    assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_download_is_retried_and_reported() {
    let h = Harness::new();
    let manifest = h.write_manifest(
        "sources.json",
        r#"{
            "ok": {"url": "https://www.youtube.com/watch?v=GOOD"},
            "bad": {"url": "https://www.youtube.com/broken?v=GONE"}
        }"#,
    );

    let summary = h
        .pipeline
        .download_all_videos(&manifest, &h.path("raw"))
        .await
        .unwrap();

    assert_eq!(summary.count(OutcomeKind::Downloaded), 1);
    assert_eq!(summary.count(OutcomeKind::Failed), 1);
    assert_eq!(summary.labels(OutcomeKind::Failed), ["GONE".to_string()]);
    assert!(summary.errors()[0].starts_with("GONE: download failed after 3 attempts"));
    assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 1 + 3);
}

#[tokio::test]
async fn test_segmented_extraction_end_to_end() {
    let h = Harness::new();
    let manifest = h.write_manifest("segmented.json", SEGMENTED);
    let raw = h.path("raw");
    let out = h.path("segmented");

    // Only AAA and BBB are downloaded; CCC has an invalid range anyway.
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::write(raw.join("AAA.mkv.mp4"), b"video").unwrap();

    let first = h
        .pipeline
        .extract_segmented_clips(&manifest, &raw, &out)
        .await
        .unwrap();

    assert_eq!(first.total(), 4);
    assert_eq!(first.count(OutcomeKind::Created), 2);
    assert_eq!(first.count(OutcomeKind::MissingInput), 1);
    assert_eq!(first.count(OutcomeKind::Error), 1);
    assert!(out.join("AAA_10_15.mp4").exists());
    assert!(out.join("AAA_20_31.mp4").exists());
    assert_eq!(h.trimmer.calls.load(Ordering::SeqCst), 2);

    let second = h
        .pipeline
        .extract_segmented_clips(&manifest, &raw, &out)
        .await
        .unwrap();

    assert_eq!(second.count(OutcomeKind::Skipped), 2);
    assert_eq!(second.count(OutcomeKind::Created), 0);
    assert_eq!(h.trimmer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_continuous_extraction_names_by_clip_name() {
    let h = Harness::new();
    let manifest = h.write_manifest(
        "continuous.json",
        r#"{
            "x": {"url": "https://www.youtube.com/watch?v=AAA", "start": 0, "end": 60, "clip_name": "AAA-inning1"},
            "y": {"url": "https://www.youtube.com/watch?v=AAA", "start": 60, "end": 120}
        }"#,
    );
    let raw = h.path("raw");
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::write(raw.join("AAA.mkv"), b"video").unwrap();
    let out = h.path("continuous");

    let summary = h
        .pipeline
        .extract_continuous_clips(&manifest, &raw, &out)
        .await
        .unwrap();

    assert_eq!(summary.count(OutcomeKind::Created), 2);
    assert!(out.join("AAA-inning1.mp4").exists());
    assert!(out.join("AAA.mp4").exists());
}

#[tokio::test]
async fn test_download_then_extract() {
    let (tx, rx) = watch::channel(RunProgress::default());
    let mut h = Harness::new();
    h.pipeline = h.pipeline.with_progress(tx);

    let manifest = h.write_manifest("segmented.json", SEGMENTED);
    let raw = h.path("raw");
    let out = h.path("segmented");

    h.pipeline.download_all_videos(&manifest, &raw).await.unwrap();
    let summary = h
        .pipeline
        .extract_segmented_clips(&manifest, &raw, &out)
        .await
        .unwrap();

    assert_eq!(summary.count(OutcomeKind::Created), 3);
    assert_eq!(summary.count(OutcomeKind::Error), 1);
    assert!(out.join("BBB_0_4.mp4").exists());

    let progress = rx.borrow().clone();
    assert_eq!(progress.stage, "segmented");
    assert_eq!((progress.completed, progress.total), (4, 4));
}

#[tokio::test]
async fn test_host_variants_of_one_video_download_once() {
    let h = Harness::new();
    let manifest = h.write_manifest(
        "variants.json",
        r#"{
            "a": {"url": "https://www.youtube.com/watch?v=XYZ"},
            "b": {"url": "https://youtube.com/watch?v=XYZ"},
            "c": {"url": "https://m.youtube.com/watch?v=XYZ"}
        }"#,
    );

    let summary = h
        .pipeline
        .download_all_videos(&manifest, &h.path("raw"))
        .await
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(summary.count(OutcomeKind::Downloaded), 1);
    assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 1);
    assert!(h.path("raw").join("XYZ.mkv.mp4").exists());
}
