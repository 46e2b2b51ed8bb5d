use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::PollError;
use crate::domain::models::{PollingConfig, TaskStatus};
use crate::domain::ports::TaskApi;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Interval and overall bound of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.interval_ms),
            Duration::from_millis(config.timeout_ms),
        )
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

/// Waits for remote tasks to reach a terminal status
pub struct TaskPoller<A: TaskApi + ?Sized> {
    api: Arc<A>,
    settings: PollSettings,
}

impl<A: TaskApi + ?Sized> TaskPoller<A> {
    pub fn new(api: Arc<A>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Re-read a task's status until it completes, fails or the timeout elapses
    ///
    /// Returns the result payload of a completed task (`Value::Null` when the
    /// remote sent none). Non-terminal statuses are re-read after the poll
    /// interval. The timeout bounds the whole wait, including reads still in
    /// flight and their retries; on expiry the result is [`PollError::TimedOut`].
    #[instrument(skip(self), fields(interval_ms = self.settings.interval.as_millis() as u64))]
    pub async fn poll_until_terminal(&self, task_id: &str) -> Result<Value, PollError> {
        let started = Instant::now();
        let reads = AtomicU32::new(0);

        let outcome = timeout(self.settings.timeout, self.poll_loop(task_id, started, &reads))
            .await
            .unwrap_or_else(|_| Err(timed_out(task_id, started)));

        if matches!(outcome, Err(PollError::TimedOut { .. })) {
            warn!(
                reads = reads.load(Ordering::Relaxed),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "polling timed out"
            );
        }
        outcome
    }

    async fn poll_loop(
        &self,
        task_id: &str,
        started: Instant,
        reads: &AtomicU32,
    ) -> Result<Value, PollError> {
        while started.elapsed() < self.settings.timeout {
            let snapshot = self.api.get_task_status(task_id).await?;
            let reads = reads.fetch_add(1, Ordering::Relaxed) + 1;

            match snapshot.status {
                TaskStatus::Completed => {
                    info!(reads, elapsed_ms = started.elapsed().as_millis() as u64, "task completed");
                    return Ok(snapshot.result.unwrap_or(Value::Null));
                }
                TaskStatus::Failed => {
                    let detail = snapshot
                        .error
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                    warn!(reads, %detail, "task failed");
                    return Err(PollError::TaskFailed {
                        task_id: task_id.to_string(),
                        detail,
                    });
                }
                TaskStatus::NotFound => {
                    warn!(reads, "task not found");
                    return Err(PollError::NotFound {
                        task_id: task_id.to_string(),
                    });
                }
                status => {
                    debug!(reads, %status, "task not settled yet");
                    sleep(self.settings.interval).await;
                }
            }
        }

        Err(timed_out(task_id, started))
    }
}

fn timed_out(task_id: &str, started: Instant) -> PollError {
    PollError::TimedOut {
        task_id: task_id.to_string(),
        elapsed: started.elapsed(),
    }
}

impl<A: TaskApi + ?Sized> Clone for TaskPoller<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            settings: self.settings,
        }
    }
}
