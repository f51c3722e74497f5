//! Source identifier derivation from video URLs.
//!
//! Downloaded files and clips are named after a short token taken from the
//! source URL: everything after the last `=` in the URL, which matches
//! `https://www.youtube.com/watch?v=VIDEO_ID` style links.
//!
//! The convention is brittle. A URL with trailing query parameters such as
//! `watch?v=abc&t=30` yields `30`, not `abc`. Callers that need anything
//! smarter must normalise their URLs before they reach a manifest.

use thiserror::Error;

/// Errors that can occur during identifier derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// URL has no `=` to split on
    #[error("no '=' in URL {0:?}, cannot derive an identifier")]
    NoDelimiter(String),

    /// Nothing follows the last `=`
    #[error("empty identifier after last '=' in URL {0:?}")]
    Empty(String),

    /// Token cannot be used as a file name
    #[error("identifier {0:?} is not a safe file name")]
    UnsafeCharacters(String),
}

/// Result type for identifier derivation.
pub type IdentifierResult<T> = Result<T, IdentifierError>;

/// Derive the source identifier from a video URL.
///
/// Returns the substring after the last `=`, trimmed of surrounding
/// whitespace. The URL scheme is never inspected, so `youtube.com/watch?v=X`
/// and `https://youtube.com/watch?v=X` both yield `X`.
///
/// # Errors
/// - [`IdentifierError::NoDelimiter`] if the URL contains no `=`
/// - [`IdentifierError::Empty`] if the URL ends with `=`
/// - [`IdentifierError::UnsafeCharacters`] if the token would escape the
///   target directory or is otherwise unusable as a file stem
pub fn source_identifier(url: &str) -> IdentifierResult<String> {
    let url = url.trim();

    let Some((_, token)) = url.rsplit_once('=') else {
        return Err(IdentifierError::NoDelimiter(url.to_string()));
    };

    if token.is_empty() {
        return Err(IdentifierError::Empty(url.to_string()));
    }

    if !is_safe_file_stem(token) {
        return Err(IdentifierError::UnsafeCharacters(token.to_string()));
    }

    Ok(token.to_string())
}

/// Check whether a string can be used as a file stem inside a directory.
pub fn is_safe_file_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem != "."
        && stem != ".."
        && !stem
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_whitespace())
}
