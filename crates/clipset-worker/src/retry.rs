//! Retry utilities with a fixed backoff.
//!
//! External tools fail for transient reasons (network hiccups, throttling,
//! a stalled transfer hitting its timeout). Operations are retried a bounded
//! number of times with a constant pause in between.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    /// Set the total number of attempts (at least one is always made).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the pause between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success { value: T, attempts: u32 },
    /// Operation failed on every attempt; `error` is the last one.
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success { .. })
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryResult::Success { attempts, .. } | RetryResult::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Execute an async operation with retry logic.
///
/// The operation receives the 1-based attempt number.
///
/// # Example
/// ```ignore
/// let config = RetryConfig::new("download").with_max_attempts(3);
/// let result = retry_async(&config, |attempt| async move {
///     downloader.download(url, output).await
/// }).await;
/// ```
pub async fn retry_async<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult::Success {
                    value,
                    attempts: attempt,
                }
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    config.operation_name, attempt, max_attempts, config.delay, e
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(
                    "{} giving up after {} attempts",
                    config.operation_name, attempt
                );
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_retry_async_immediate_success() {
        let config = RetryConfig::new("test");
        let call_count = AtomicU32::new(0);

        let result = retry_async(&config, |_| {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(42) }
        })
        .await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 1);
        assert!(matches!(result, RetryResult::Success { value: 42, .. }));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_async_eventual_success() {
        let config = RetryConfig::new("test").with_delay(Duration::from_millis(1));
        let call_count = AtomicU32::new(0);

        let result = retry_async(&config, |attempt| {
            call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err("transient error")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 3);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_async_exhausts_attempts_with_fixed_delay() {
        let delay = Duration::from_millis(25);
        let config = RetryConfig::new("test").with_max_attempts(3).with_delay(delay);
        let call_count = AtomicU32::new(0);
        let started = Instant::now();

        let result = retry_async(&config, |attempt| {
            call_count.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(format!("failure {}", attempt)) }
        })
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        // Two pauses between three attempts, none after the last.
        assert!(started.elapsed() >= delay * 2);
        match result {
            RetryResult::Failed { error, attempts } => {
                assert_eq!(attempts, 3);
                assert_eq!(error, "failure 3");
            }
            RetryResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let config = RetryConfig::new("test").with_max_attempts(0);
        let result = retry_async(&config, |_| async { Err::<(), _>("nope") }).await;
        assert_eq!(result.attempts(), 1);
    }
}
