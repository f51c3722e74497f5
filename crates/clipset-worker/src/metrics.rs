//! Metrics for batch runs.
//!
//! Emitted through the `metrics` facade. The binary installs a Prometheus
//! recorder when a metrics file is configured and writes one snapshot in the
//! text exposition format when the run ends. Library callers may install
//! their own recorder instead; with none installed these calls are no-ops.

use std::path::Path;

use clipset_models::OutcomeKind;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const ITEMS_TOTAL: &str = "clipset_items_total";
    pub const STAGE_DURATION_SECONDS: &str = "clipset_stage_duration_seconds";
}

/// Install the Prometheus recorder globally.
pub fn install_prometheus() -> WorkerResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| WorkerError::config_error(format!("failed to install metrics recorder: {}", e)))
}

/// Write the current metrics to `path`, for a textfile collector.
pub async fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> WorkerResult<()> {
    tokio::fs::write(path, handle.render()).await?;
    Ok(())
}

/// Record one finished item.
pub fn record_item(stage: &str, outcome: OutcomeKind) {
    let labels = [
        ("stage", stage.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];
    counter!(names::ITEMS_TOTAL, &labels).increment(1);
}

/// Record the wall-clock duration of a stage.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}
