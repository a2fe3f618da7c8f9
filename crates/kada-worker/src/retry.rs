//! Retry utilities with a fixed attempt budget.
//!
//! The budget counts every attempt including the first. The pause between
//! attempts is constant and no pause follows the final attempt.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between two attempts.
    pub backoff: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
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

    /// Set the attempt budget (at least one attempt is always made).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the pause between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded on attempt `attempts`.
    Success { value: T, attempts: u32 },
    /// Operation failed on every attempt.
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success { .. })
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryResult::Success { attempts, .. } | RetryResult::Failed { attempts, .. } => *attempts,
        }
    }

    /// Number of pauses taken between attempts.
    pub fn backoffs(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }
}

/// Execute an async operation until it succeeds or the budget is spent.
///
/// # Example
/// ```ignore
/// let config = RetryConfig::new("put_events").with_max_attempts(3);
/// let result = retry_async(&config, || async { publisher.put_event(&entry).await }).await;
/// ```
pub async fn retry_async<F, Fut, T, E>(config: &RetryConfig, operation: F) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => {
                return RetryResult::Success {
                    value,
                    attempts: attempt,
                }
            }
            Err(e) if attempt < max_attempts => {
                debug!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    config.operation_name, attempt, max_attempts, config.backoff, e
                );
                tokio::time::sleep(config.backoff).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    "{} failed after {} attempts: {}",
                    config.operation_name, attempt, e
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

    #[tokio::test]
    async fn test_retry_async_immediate_success() {
        let config = RetryConfig::new("test");
        let call_count = AtomicU32::new(0);

        let result = retry_async(&config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(42) }
        })
        .await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 1);
        assert_eq!(result.backoffs(), 0);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_async_exhausts_budget_without_trailing_sleep() {
        let config = RetryConfig::new("test")
            .with_max_attempts(3)
            .with_backoff(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        let result = retry_async(&config, || async { Err::<(), _>("still failing") }).await;

        assert!(!result.is_success());
        assert_eq!(result.attempts(), 3);
        assert_eq!(result.backoffs(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[test]
    fn test_budget_has_at_least_one_attempt() {
        assert_eq!(RetryConfig::new("test").with_max_attempts(0).max_attempts, 1);
    }
}
