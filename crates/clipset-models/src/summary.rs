//! Run summary aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::outcome::{Outcome, OutcomeKind};

/// Aggregated result of one batch run.
///
/// Counts cover the full tag set, so a summary built from an empty batch
/// reports zero for every tag. Counts do not depend on the order outcomes
/// arrive in; `errors` and the per-tag item lists keep arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Stage name (e.g. "download", "segmented")
    pub stage: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    counts: BTreeMap<OutcomeKind, usize>,
    items: BTreeMap<OutcomeKind, Vec<String>>,
    errors: Vec<String>,
}

impl RunSummary {
    /// Create an empty summary for a stage.
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            started_at: Utc::now(),
            finished_at: None,
            counts: OutcomeKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
            items: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Fold labelled outcomes into a finished summary.
    pub fn from_outcomes<I, L>(stage: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (L, Outcome)>,
        L: Into<String>,
    {
        let mut summary = Self::new(stage);
        for (label, outcome) in outcomes {
            summary.record(label, &outcome);
        }
        summary.finish()
    }

    /// Record one item's outcome.
    pub fn record(&mut self, label: impl Into<String>, outcome: &Outcome) {
        let label = label.into();
        let kind = outcome.kind();

        *self.counts.entry(kind).or_insert(0) += 1;

        if let Some(reason) = outcome.reason() {
            self.errors.push(format!("{}: {}", label, reason));
        }
        self.items.entry(kind).or_default().push(label);
    }

    /// Mark the summary as complete.
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Number of items with the given tag.
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of recorded items.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Failure and error details in arrival order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Labels of items with the given tag, in arrival order.
    pub fn labels(&self, kind: OutcomeKind) -> &[String] {
        self.items.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every item finished without failure.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.stage)?;
        for kind in OutcomeKind::ALL {
            write!(f, " {}={}", kind, self.count(kind))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<(&'static str, Outcome)> {
        vec![
            ("a", Outcome::Created),
            ("b", Outcome::Skipped),
            ("c", Outcome::error("ffmpeg exploded")),
            ("d", Outcome::MissingInput),
            ("e", Outcome::Created),
            ("f", Outcome::failed("timed out")),
        ]
    }

    #[test]
    fn test_empty_summary_reports_all_zero() {
        let summary = RunSummary::from_outcomes("empty", Vec::<(String, Outcome)>::new());

        assert_eq!(summary.total(), 0);
        for kind in OutcomeKind::ALL {
            assert_eq!(summary.count(kind), 0);
        }
        assert!(summary.is_clean());
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn test_counts_sum_to_item_count() {
        let outcomes = sample();
        let summary = RunSummary::from_outcomes("clips", outcomes.clone());

        assert_eq!(summary.total(), outcomes.len());
        assert_eq!(summary.count(OutcomeKind::Created), 2);
        assert_eq!(summary.count(OutcomeKind::Skipped), 1);
        assert_eq!(summary.count(OutcomeKind::MissingInput), 1);
        assert_eq!(summary.count(OutcomeKind::Failed), 1);
        assert_eq!(summary.count(OutcomeKind::Error), 1);
        assert_eq!(summary.labels(OutcomeKind::Created), ["a", "e"]);
    }

    #[test]
    fn test_errors_keep_arrival_order() {
        let summary = RunSummary::from_outcomes("clips", sample());
        assert_eq!(summary.errors(), ["c: ffmpeg exploded", "f: timed out"]);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_counts_are_order_independent() {
        let forward = RunSummary::from_outcomes("clips", sample());
        let backward = RunSummary::from_outcomes("clips", sample().into_iter().rev());

        for kind in OutcomeKind::ALL {
            assert_eq!(forward.count(kind), backward.count(kind));
        }
    }

    #[test]
    fn test_display() {
        let summary = RunSummary::from_outcomes("download", vec![("x", Outcome::Downloaded)]);
        let text = summary.to_string();
        assert!(text.starts_with("download:"));
        assert!(text.contains("Downloaded=1"));
        assert!(text.contains("Missing Input=0"));
    }

    #[test]
    fn test_serializes_counts_by_tag() {
        let summary = RunSummary::from_outcomes("clips", sample());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["counts"]["created"], 2);
        assert_eq!(json["counts"]["downloaded"], 0);
        assert_eq!(json["errors"][0], "c: ffmpeg exploded");
    }
}
