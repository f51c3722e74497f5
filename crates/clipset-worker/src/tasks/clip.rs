//! Clip extraction from downloaded sources.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use clipset_media::{ClipTrimmer, TrimRequest};
use clipset_models::{is_safe_file_stem, ClipDescriptor, Outcome};

use crate::config::{ClipNaming, ClipStageConfig};
use crate::tasks::{file_exists, find_source};

/// Cuts one clip out of its downloaded source.
pub struct ClipTask {
    trimmer: Arc<dyn ClipTrimmer>,
    input_dir: PathBuf,
    output_dir: PathBuf,
    stage: ClipStageConfig,
}

impl ClipTask {
    pub fn new(
        trimmer: Arc<dyn ClipTrimmer>,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        stage: ClipStageConfig,
    ) -> Self {
        Self {
            trimmer,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            stage,
        }
    }

    /// Output file name for a clip of the source `id`.
    pub fn output_name(&self, clip: &ClipDescriptor, id: &str) -> Result<String, String> {
        match self.stage.naming {
            ClipNaming::Segmented => Ok(format!(
                "{}_{}_{}.mp4",
                id,
                clip.start.trunc() as i64,
                clip.end.trunc() as i64
            )),
            ClipNaming::Continuous => match clip.clip_name.as_deref() {
                Some(name) if is_safe_file_stem(name) => Ok(format!("{}.mp4", name)),
                Some(name) => Err(format!("clip name {:?} is not a usable file name", name)),
                None => Ok(format!("{}.mp4", id)),
            },
        }
    }

    /// Extract `clip` unless its output already exists.
    pub async fn run(&self, clip: ClipDescriptor) -> Outcome {
        let duration = match clip.duration() {
            Ok(duration) => duration,
            Err(e) => return Outcome::error(e.to_string()),
        };

        let id = match clip.identifier() {
            Ok(id) => id,
            Err(e) => return Outcome::error(e.to_string()),
        };

        let output = match self.output_name(&clip, &id) {
            Ok(name) => self.output_dir.join(name),
            Err(reason) => return Outcome::error(reason),
        };

        if self.stage.skip_existing && file_exists(&output).await {
            debug!("Clip {} already exists", output.display());
            return Outcome::Skipped;
        }

        let Some(input) = find_source(&self.input_dir, &id).await else {
            debug!("No downloaded source for {} in {}", id, self.input_dir.display());
            return Outcome::MissingInput;
        };

        self.trim(input, output, clip.start, duration).await
    }

    async fn trim(&self, input: PathBuf, output: PathBuf, start: f64, duration: f64) -> Outcome {
        let request = TrimRequest {
            input,
            output,
            start,
            duration,
        };

        match self.trimmer.trim(&request).await {
            Ok(()) => Outcome::Created,
            Err(e) => Outcome::error(e.diagnostic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clipset_media::{MediaError, MediaResult};

    /// Records requests and writes a small file in place of a real cut.
    #[derive(Default)]
    struct FakeTrimmer {
        requests: Mutex<Vec<TrimRequest>>,
        fail_with: Option<String>,
    }

    impl FakeTrimmer {
        fn failing(output: &str) -> Self {
            Self {
                fail_with: Some(output.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ClipTrimmer for FakeTrimmer {
        async fn trim(&self, request: &TrimRequest) -> MediaResult<()> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(output) = &self.fail_with {
                return Err(MediaError::tool_failed(
                    "ffmpeg",
                    "exited with status 1",
                    Some(output.clone()),
                    Some(1),
                ));
            }
            tokio::fs::write(&request.output, b"clip").await?;
            Ok(())
        }
    }

    struct Dirs {
        input: tempfile::TempDir,
        output: tempfile::TempDir,
    }

    fn dirs_with_source(file: &str) -> Dirs {
        let dirs = Dirs {
            input: tempfile::tempdir().unwrap(),
            output: tempfile::tempdir().unwrap(),
        };
        std::fs::write(dirs.input.path().join(file), b"video").unwrap();
        dirs
    }

    fn task(trimmer: &Arc<FakeTrimmer>, dirs: &Dirs, stage: ClipStageConfig) -> ClipTask {
        ClipTask::new(
            Arc::clone(trimmer) as Arc<dyn ClipTrimmer>,
            dirs.input.path(),
            dirs.output.path(),
            stage,
        )
    }

    fn clip(start: f64, end: f64, clip_name: Option<&str>) -> ClipDescriptor {
        ClipDescriptor {
            url: "https://youtube.com/watch?v=XYZ".to_string(),
            start,
            end,
            clip_name: clip_name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_segmented_clip_created_then_skipped() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::SEGMENTED);

        assert_eq!(task.run(clip(10.0, 15.0, None)).await, Outcome::Created);
        assert!(dirs.output.path().join("XYZ_10_15.mp4").exists());

        {
            let requests = trimmer.requests.lock().unwrap();
            assert_eq!(requests[0].input, dirs.input.path().join("XYZ.mkv.mp4"));
            assert_eq!(requests[0].start, 10.0);
            assert_eq!(requests[0].duration, 5.0);
        }

        assert_eq!(task.run(clip(10.0, 15.0, None)).await, Outcome::Skipped);
        assert_eq!(trimmer.calls(), 1);
    }

    #[tokio::test]
    async fn test_segmented_name_truncates_fractional_seconds() {
        let dirs = dirs_with_source("XYZ.mkv");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::SEGMENTED);

        assert_eq!(task.run(clip(10.9, 15.2, None)).await, Outcome::Created);
        assert!(dirs.output.path().join("XYZ_10_15.mp4").exists());

        let requests = trimmer.requests.lock().unwrap();
        assert_eq!(requests[0].input, dirs.input.path().join("XYZ.mkv"));
        assert!((requests[0].duration - 4.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_continuous_clip_uses_clip_name() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::CONTINUOUS);

        assert_eq!(task.run(clip(0.0, 30.0, Some("intro"))).await, Outcome::Created);
        assert!(dirs.output.path().join("intro.mp4").exists());

        assert_eq!(task.run(clip(30.0, 60.0, None)).await, Outcome::Created);
        assert!(dirs.output.path().join("XYZ.mp4").exists());
    }

    #[tokio::test]
    async fn test_unsafe_clip_name_is_an_error() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::CONTINUOUS);

        let outcome = task.run(clip(0.0, 30.0, Some("../escape"))).await;

        assert!(matches!(outcome, Outcome::Error(_)));
        assert_eq!(trimmer.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_reported() {
        let dirs = dirs_with_source("OTHER.mkv");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::SEGMENTED);

        assert_eq!(task.run(clip(10.0, 15.0, None)).await, Outcome::MissingInput);
        assert_eq!(trimmer.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_range_is_an_error() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        let trimmer = Arc::new(FakeTrimmer::default());
        let task = task(&trimmer, &dirs, ClipStageConfig::SEGMENTED);

        assert!(matches!(task.run(clip(15.0, 15.0, None)).await, Outcome::Error(_)));
        assert!(matches!(task.run(clip(20.0, 15.0, None)).await, Outcome::Error(_)));
        assert_eq!(trimmer.calls(), 0);
    }

    #[tokio::test]
    async fn test_trim_failure_carries_tool_output() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        let trimmer = Arc::new(FakeTrimmer::failing("Invalid data found when processing input"));
        let task = task(&trimmer, &dirs, ClipStageConfig::SEGMENTED);

        let outcome = task.run(clip(10.0, 15.0, None)).await;

        assert_eq!(
            outcome,
            Outcome::error("Invalid data found when processing input")
        );
    }

    #[tokio::test]
    async fn test_overwrite_when_skip_disabled() {
        let dirs = dirs_with_source("XYZ.mkv.mp4");
        std::fs::write(dirs.output.path().join("XYZ_10_15.mp4"), b"old").unwrap();
        let trimmer = Arc::new(FakeTrimmer::default());
        let stage = ClipStageConfig::SEGMENTED.with_skip_existing(false);
        let task = task(&trimmer, &dirs, stage);

        assert_eq!(task.run(clip(10.0, 15.0, None)).await, Outcome::Created);
        assert_eq!(trimmer.calls(), 1);
    }
}
