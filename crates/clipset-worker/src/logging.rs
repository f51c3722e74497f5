//! Structured stage logging utilities.
//!
//! Provides tracing initialisation for the binary and a small helper that
//! stamps every stage event with the run id and stage name.

use tracing::{info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipset_models::RunSummary;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` replaces the default `clipset=info` directives. `LOG_FORMAT=json`
/// switches from coloured text to JSON lines. Logs go to stderr; stdout is
/// kept for run summaries.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clipset=info,clipset_worker=info,clipset_media=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Stage logger for consistent lifecycle events.
#[derive(Debug, Clone)]
pub struct StageLogger {
    run_id: String,
    stage: String,
}

impl StageLogger {
    pub fn new(run_id: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            stage: stage.into(),
        }
    }

    /// Log the start of a stage with its item count.
    pub fn log_start(&self, total: usize, workers: usize) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            total,
            workers,
            "Stage started"
        );
    }

    /// Log one finished item.
    pub fn log_progress(&self, completed: usize, total: usize, label: &str, outcome: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            item = %label,
            outcome,
            "[{}/{}] {}", completed, total, label
        );
    }

    /// Log a non-fatal problem with one item.
    pub fn log_warning(&self, label: &str, message: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %self.stage,
            item = %label,
            "{}", message
        );
    }

    /// Log the end of a stage.
    pub fn log_completion(&self, summary: &RunSummary) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            total = summary.total(),
            "Stage completed: {}", summary
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Create a tracing span for this stage.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("stage", run_id = %self.run_id, stage = %self.stage)
    }
}
