//! Batch download and clip extraction worker.
//!
//! This crate provides:
//! - A bounded-concurrency batch runner with per-item outcome classification
//! - Download and clip tasks with skip, retry and missing-input handling
//! - Pipelines that load a manifest and run a whole stage
//! - Structured stage logging and outcome metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod retry;
pub mod runner;
pub mod tasks;

pub use config::{ClipNaming, ClipStageConfig, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::StageLogger;
pub use pipeline::Pipeline;
pub use retry::{retry_async, RetryConfig, RetryResult};
pub use runner::{BatchRunner, JobItem, RunProgress};
pub use tasks::{ClipTask, DownloadTask};
