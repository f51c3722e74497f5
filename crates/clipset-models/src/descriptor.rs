//! Manifest entry models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::{source_identifier, IdentifierResult};

/// A source video to download.
///
/// Any manifest entry with a `url` field deserializes into this, so clip
/// manifests double as download manifests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Video URL
    pub url: String,
}

impl SourceDescriptor {
    /// Derive the on-disk identifier for this source.
    pub fn identifier(&self) -> IdentifierResult<String> {
        source_identifier(&self.url)
    }
}

/// A time range to cut out of a downloaded source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Source video URL (the identifier is derived from it)
    pub url: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Explicit output name, used by continuous extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_name: Option<String>,
}

/// Invalid clip time range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipRangeError {
    #[error("clip bounds must be finite (start: {start}, end: {end})")]
    NotFinite { start: f64, end: f64 },

    #[error("clip start {0} is negative")]
    NegativeStart(f64),

    #[error("clip duration must be positive (start: {start}, end: {end})")]
    EmptyRange { start: f64, end: f64 },
}

impl ClipDescriptor {
    /// Derive the on-disk identifier of the source video.
    pub fn identifier(&self) -> IdentifierResult<String> {
        source_identifier(&self.url)
    }

    /// Validate the time range and return the clip duration in seconds.
    pub fn duration(&self) -> Result<f64, ClipRangeError> {
        let (start, end) = (self.start, self.end);

        if !start.is_finite() || !end.is_finite() {
            return Err(ClipRangeError::NotFinite { start, end });
        }
        if start < 0.0 {
            return Err(ClipRangeError::NegativeStart(start));
        }

        let duration = end - start;
        if duration <= 0.0 {
            return Err(ClipRangeError::EmptyRange { start, end });
        }

        Ok(duration)
    }
}
