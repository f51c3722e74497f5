//! Bounded-concurrency batch runner.
//!
//! Every item of a batch runs as its own tokio task, gated by a semaphore so
//! at most `workers` items are in flight. Results are collected in completion
//! order and folded into a [`RunSummary`]; a task that panics is reported as
//! an error for that item only.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinError;
use tracing::Instrument;
use uuid::Uuid;

use clipset_models::{ClipDescriptor, Outcome, RunSummary, SourceDescriptor};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::StageLogger;
use crate::metrics;

/// A unit of work that can be reported on.
pub trait JobItem: Send + 'static {
    /// Label used in logs and summaries.
    fn label(&self) -> String;
}

impl JobItem for SourceDescriptor {
    fn label(&self) -> String {
        self.identifier().unwrap_or_else(|_| self.url.clone())
    }
}

impl JobItem for ClipDescriptor {
    fn label(&self) -> String {
        if let Some(name) = &self.clip_name {
            return name.clone();
        }
        let id = self.identifier().unwrap_or_else(|_| self.url.clone());
        format!("{}[{}-{}]", id, self.start, self.end)
    }
}

/// Progress snapshot published while a batch runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProgress {
    pub stage: String,
    pub completed: usize,
    pub total: usize,
}

impl RunProgress {
    /// Whether every item of the batch has finished.
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Runs batches of independent items on a fixed-size pool.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    workers: usize,
    run_id: String,
    progress: Option<watch::Sender<RunProgress>>,
}

impl BatchRunner {
    /// Create a runner with `workers` concurrent slots.
    pub fn new(workers: usize) -> WorkerResult<Self> {
        if workers == 0 {
            return Err(WorkerError::config_error("workers must be at least 1"));
        }
        Ok(Self {
            workers,
            run_id: Uuid::new_v4().to_string(),
            progress: None,
        })
    }

    /// Tag log events with a caller-chosen run id.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Publish progress snapshots to a watch channel.
    pub fn with_progress(mut self, progress: watch::Sender<RunProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Run `task` for every item and summarise the outcomes.
    ///
    /// Returns once every item has finished. The summary holds exactly one
    /// outcome per input item.
    pub async fn run<T, F, Fut>(&self, stage: &str, items: Vec<T>, task: F) -> RunSummary
    where
        T: JobItem,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let logger = StageLogger::new(&self.run_id, stage);
        let span = logger.create_span();
        let total = items.len();
        let started = Instant::now();

        logger.log_start(total, self.workers);
        self.publish(stage, 0, total);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut pending = FuturesUnordered::new();

        for item in items {
            let label = item.label();
            let work = task(item);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(
                async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return Outcome::error("worker pool closed"),
                    };
                    work.await
                }
                .instrument(span.clone()),
            );

            pending.push(async move { (label, handle.await) });
        }

        let mut summary = RunSummary::new(stage);
        let mut completed = 0;

        while let Some((label, joined)) = pending.next().await {
            let outcome = joined.unwrap_or_else(join_error_outcome);
            completed += 1;

            if let Some(reason) = outcome.reason() {
                logger.log_warning(&label, reason);
            }
            logger.log_progress(completed, total, &label, outcome.kind().as_str());
            metrics::record_item(stage, outcome.kind());

            summary.record(label, &outcome);
            self.publish(stage, completed, total);
        }

        let summary = summary.finish();
        metrics::record_stage_duration(stage, started.elapsed().as_secs_f64());
        logger.log_completion(&summary);
        summary
    }

    fn publish(&self, stage: &str, completed: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress.send_replace(RunProgress {
                stage: stage.to_string(),
                completed,
                total,
            });
        }
    }
}

fn join_error_outcome(err: JoinError) -> Outcome {
    if err.is_panic() {
        Outcome::error(format!("task panicked: {}", panic_message(err.into_panic())))
    } else {
        Outcome::error("task cancelled")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
