//! Per-item processing outcomes.

use serde::{Deserialize, Serialize};

/// Classification of a single item's processing result.
///
/// Every item processed by a batch yields exactly one outcome. Outcomes are
/// terminal: an item never moves from one outcome to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// Clip written
    Created,
    /// Output already present, nothing to do
    Skipped,
    /// Required input file is absent
    MissingInput,
    /// Source video downloaded
    Downloaded,
    /// Download retries exhausted
    Failed(String),
    /// Item could not be processed
    Error(String),
}

impl Outcome {
    /// Create a failed outcome.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Create an error outcome.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Get the tag of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Created => OutcomeKind::Created,
            Outcome::Skipped => OutcomeKind::Skipped,
            Outcome::MissingInput => OutcomeKind::MissingInput,
            Outcome::Downloaded => OutcomeKind::Downloaded,
            Outcome::Failed(_) => OutcomeKind::Failed,
            Outcome::Error(_) => OutcomeKind::Error,
        }
    }

    /// Diagnostic text for failures and errors.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Failed(reason) | Outcome::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check if this outcome should be reported as a failure.
    pub fn is_failure(&self) -> bool {
        self.kind().is_failure()
    }
}

/// Tag of an [`Outcome`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Created,
    Skipped,
    MissingInput,
    Downloaded,
    Failed,
    Error,
}

impl OutcomeKind {
    /// Every tag, in reporting order.
    pub const ALL: [OutcomeKind; 6] = [
        OutcomeKind::Created,
        OutcomeKind::Skipped,
        OutcomeKind::MissingInput,
        OutcomeKind::Downloaded,
        OutcomeKind::Failed,
        OutcomeKind::Error,
    ];

    /// Stable snake_case name, used for metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Created => "created",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::MissingInput => "missing_input",
            OutcomeKind::Downloaded => "downloaded",
            OutcomeKind::Failed => "failed",
            OutcomeKind::Error => "error",
        }
    }

    /// Whether items with this tag carry diagnostic details.
    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeKind::Failed | OutcomeKind::Error)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Created => write!(f, "Created"),
            OutcomeKind::Skipped => write!(f, "Skipped"),
            OutcomeKind::MissingInput => write!(f, "Missing Input"),
            OutcomeKind::Downloaded => write!(f, "Downloaded"),
            OutcomeKind::Failed => write!(f, "Failed"),
            OutcomeKind::Error => write!(f, "Errors"),
        }
    }
}
