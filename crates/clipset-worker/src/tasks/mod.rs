//! Per-item work for each stage.
//!
//! Tasks never return errors: whatever happens to an item is turned into its
//! [`clipset_models::Outcome`].

mod clip;
mod download;

use std::path::{Path, PathBuf};

pub use clip::ClipTask;
pub use download::DownloadTask;

/// Files a downloaded source may occupy, in the order clips prefer them.
///
/// Downloads are requested as `<id>.mkv`, but yt-dlp merges some formats to
/// `<id>.mkv.mp4`.
pub fn source_candidates(dir: &Path, id: &str) -> [PathBuf; 2] {
    [
        dir.join(format!("{}.mkv.mp4", id)),
        dir.join(format!("{}.mkv", id)),
    ]
}

/// First existing source file for `id`, if any.
pub async fn find_source(dir: &Path, id: &str) -> Option<PathBuf> {
    for candidate in source_candidates(dir, id) {
        if file_exists(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

pub(crate) async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
