use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::domain::errors::ApiError;
use crate::domain::models::RetryConfig;

/// Retry accounting for one logical call chain.
///
/// A fresh budget is created for every [`RetryPolicy::execute`] call, so
/// concurrent operations on the same client never share a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    max_retries: u32,
    used: u32,
}

impl RetryBudget {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            used: 0,
        }
    }

    /// Consume one retry, returning the 1-based retry number, or `None` when
    /// the budget is spent.
    pub fn try_consume(&mut self) -> Option<u32> {
        if self.used < self.max_retries {
            self.used += 1;
            Some(self.used)
        } else {
            None
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max_retries
    }
}

/// Fixed-delay retry policy for remote calls
///
/// Transient failures (network errors, 5xx, 408) are retried up to
/// `max_retries` times with the same delay between attempts. Anything else
/// is returned on the first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use taskprobe::infrastructure::api::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_secs(1));
    /// assert_eq!(policy.max_retries(), 3);
    /// ```
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Execute `operation`, retrying transient failures
    ///
    /// `operation` is invoked once per attempt and must repeat the same
    /// request each time. After the budget is spent the last error is
    /// returned unchanged.
    ///
    /// # Example
    /// ```no_run
    /// # use std::time::Duration;
    /// # use taskprobe::domain::ApiError;
    /// # use taskprobe::infrastructure::api::RetryPolicy;
    /// # async fn example() -> Result<u32, ApiError> {
    /// let policy = RetryPolicy::new(3, Duration::from_millis(500));
    ///
    /// let value = policy.execute("answer", || async { Ok(42) }).await?;
    /// # Ok(value)
    /// # }
    /// ```
    pub async fn execute<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut budget = RetryBudget::new(self.max_retries);

        loop {
            match operation().await {
                Ok(value) => {
                    if budget.used() > 0 {
                        debug!(operation = label, retries = budget.used(), "succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_transient() => {
                    debug!(operation = label, error = %err, "permanent error, not retrying");
                    return Err(err);
                }
                Err(err) => match budget.try_consume() {
                    Some(attempt) => {
                        warn!(
                            operation = label,
                            attempt,
                            max_retries = self.max_retries,
                            error = %err,
                            "Retrying {label} ({attempt}/{})...",
                            self.max_retries
                        );
                        sleep(self.delay).await;
                    }
                    None => {
                        error!(
                            operation = label,
                            retries = budget.used(),
                            error = %err,
                            "Error in {label}"
                        );
                        return Err(err);
                    }
                },
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
