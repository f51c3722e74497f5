//! Manifest loading.
//!
//! A manifest is a JSON object mapping opaque keys to entry records:
//!
//! ```json
//! {
//!     "a1b2": {"url": "https://www.youtube.com/watch?v=XYZ", "start": 10, "end": 15},
//!     "c3d4": {"url": "https://www.youtube.com/watch?v=XYZ", "start": 42, "end": 48.5}
//! }
//! ```
//!
//! Entries keep the order they have in the file. Loading is all-or-nothing:
//! one malformed entry fails the whole manifest.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::descriptor::SourceDescriptor;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest root must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid manifest entry {key:?}: {source}")]
    InvalidEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// Create a read failure for the given path.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Ordered collection of manifest entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest<T> {
    entries: Vec<(String, T)>,
}

impl<T: DeserializeOwned> Manifest<T> {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(raw: &str) -> ManifestResult<Self> {
        let root: Value = serde_json::from_str(raw)?;

        let map = match root {
            Value::Object(map) => map,
            other => return Err(ManifestError::NotAnObject(json_type_name(&other))),
        };

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            match serde_json::from_value(value) {
                Ok(entry) => entries.push((key, entry)),
                Err(source) => return Err(ManifestError::InvalidEntry { key, source }),
            }
        }

        Ok(Self { entries })
    }
}

impl<T> Manifest<T> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, entry)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Consume the manifest, keeping only the entries in file order.
    pub fn into_descriptors(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

impl Manifest<SourceDescriptor> {
    /// Consume the manifest, keeping one entry per download target.
    ///
    /// Entries are keyed by their source identifier, the stem of the
    /// downloaded file; URLs without one are keyed by the URL itself. Returns
    /// the first entry for every key in file order together with the number
    /// of duplicates removed.
    pub fn into_unique_sources(self) -> (Vec<SourceDescriptor>, usize) {
        let total = self.entries.len();
        let mut seen = HashSet::with_capacity(total);

        let unique: Vec<SourceDescriptor> = self
            .into_descriptors()
            .into_iter()
            .filter(|source| {
                let key = source
                    .identifier()
                    .unwrap_or_else(|_| source.url.trim().to_string());
                seen.insert(key)
            })
            .collect();

        let duplicates = total - unique.len();
        (unique, duplicates)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
