//! Error types for media operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        output: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failed(
        tool: impl Into<String>,
        message: impl Into<String>,
        output: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
            output,
            exit_code,
        }
    }

    /// Create a timeout error.
    pub fn timeout(tool: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            after,
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Human-readable diagnostic for reports.
    ///
    /// Uses the captured tool output when there is any, else the message.
    pub fn diagnostic(&self) -> String {
        match self {
            MediaError::ToolFailed {
                output: Some(output),
                ..
            } if !output.trim().is_empty() => output.trim().to_string(),
            other => other.to_string(),
        }
    }

    /// Check if the error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MediaError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_tool_output() {
        let err = MediaError::tool_failed(
            "ffmpeg",
            "exited with status 1",
            Some("input.mp4: Invalid data found when processing input\n".to_string()),
            Some(1),
        );
        assert_eq!(
            err.diagnostic(),
            "input.mp4: Invalid data found when processing input"
        );
    }

    #[test]
    fn test_diagnostic_falls_back_to_message() {
        let err = MediaError::tool_failed("yt-dlp", "exited with status 2", Some("  ".into()), Some(2));
        assert_eq!(err.diagnostic(), "yt-dlp failed: exited with status 2");

        let err = MediaError::timeout("yt-dlp", Duration::from_secs(600));
        assert!(err.is_timeout());
        assert_eq!(err.diagnostic(), "yt-dlp timed out after 600s");
    }
}
