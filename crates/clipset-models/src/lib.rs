//! Shared data models for clipset.
//!
//! This crate provides:
//! - Manifest entries (source videos and clip ranges)
//! - Manifest loading with file-order preservation
//! - Source identifier derivation from video URLs
//! - Per-item outcomes and the run summary they fold into

pub mod descriptor;
pub mod identifier;
pub mod manifest;
pub mod outcome;
pub mod summary;

// Re-export common types
pub use descriptor::{ClipDescriptor, ClipRangeError, SourceDescriptor};
pub use identifier::{is_safe_file_stem, source_identifier, IdentifierError, IdentifierResult};
pub use manifest::{Manifest, ManifestError, ManifestResult};
pub use outcome::{Outcome, OutcomeKind};
pub use summary::RunSummary;
