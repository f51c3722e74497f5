//! Worker error types.
//!
//! Only run-level problems are errors. Anything that goes wrong with a single
//! item is reported through its [`clipset_models::Outcome`] instead.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(#[from] clipset_models::ManifestError),

    #[error("Media error: {0}")]
    Media(#[from] clipset_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
