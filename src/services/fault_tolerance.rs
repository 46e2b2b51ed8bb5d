//! Fault tolerance checks: malformed submissions and status read integrity.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::consistency::safely_cancel;
use crate::domain::errors::{ApiError, ProbeError};
use crate::domain::models::{malformed_inputs, ProbeConfig, Submission, TaskStatus};
use crate::domain::ports::TaskApi;

/// How the service answered one malformed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputOutcome {
    Accepted { task_id: String },
    RateLimited,
    /// Refused with a client error status
    Rejected { status: u16 },
    /// Answered with a 5xx
    ServerError { status: u16 },
    /// No HTTP answer at all
    Failed { error: String },
}

impl InputOutcome {
    fn from_error(err: &ApiError) -> Self {
        match err.status() {
            Some(status) if status.is_server_error() => Self::ServerError {
                status: status.as_u16(),
            },
            Some(status) => Self::Rejected {
                status: status.as_u16(),
            },
            None => Self::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Accepted, throttled or cleanly refused
    pub fn is_graceful(&self) -> bool {
        matches!(
            self,
            Self::Accepted { .. } | Self::RateLimited | Self::Rejected { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputCase {
    pub label: &'static str,
    /// Length of the submitted description in chars
    pub length: usize,
    pub outcome: InputOutcome,
}

/// Result of the malformed input check
#[derive(Debug, Clone, Serialize)]
pub struct MalformedInputReport {
    pub cases: Vec<InputCase>,
    pub passed: bool,
}

/// Result of the status integrity check
#[derive(Debug, Clone, Serialize)]
pub struct StatusIntegrityReport {
    pub task_id: String,
    pub initial: TaskStatus,
    /// Status seen by each concurrent read; `None` for a failed read
    pub concurrent: Vec<Option<TaskStatus>>,
    #[serde(rename = "final")]
    pub final_status: TaskStatus,
    pub passed: bool,
}

/// Feeds the service bad input and concurrent reads and checks it holds up
pub struct FaultToleranceProbe<A: TaskApi + ?Sized> {
    api: Arc<A>,
    concurrent_reads: usize,
}

impl<A: TaskApi + ?Sized> FaultToleranceProbe<A> {
    pub fn new(api: Arc<A>, concurrent_reads: usize) -> Self {
        Self {
            api,
            concurrent_reads,
        }
    }

    pub fn from_config(api: Arc<A>, config: &ProbeConfig) -> Self {
        Self::new(api, config.concurrent_status_reads)
    }

    /// Submit each malformed description in turn
    ///
    /// Passes when no submission ends in a 5xx or without an HTTP answer.
    /// Accepted tasks are cancelled right away.
    #[instrument(skip(self))]
    pub async fn check_malformed_inputs(&self) -> MalformedInputReport {
        let mut cases = Vec::new();

        for (label, description) in malformed_inputs() {
            let outcome = match self.api.submit_task(&description).await {
                Ok(Submission::Accepted(handle)) => {
                    safely_cancel(self.api.as_ref(), &handle.task_id).await;
                    InputOutcome::Accepted {
                        task_id: handle.task_id,
                    }
                }
                Ok(Submission::RateLimited) => InputOutcome::RateLimited,
                Err(err) => InputOutcome::from_error(&err),
            };

            if outcome.is_graceful() {
                info!(label, ?outcome, "malformed input handled");
            } else {
                warn!(label, ?outcome, "malformed input not handled gracefully");
            }
            cases.push(InputCase {
                label,
                length: description.chars().count(),
                outcome,
            });
        }

        let passed = cases.iter().all(|case| case.outcome.is_graceful());
        MalformedInputReport { cases, passed }
    }

    /// Read one task's status before, during and after a burst of concurrent reads
    ///
    /// Passes when every read succeeds and the final status equals the
    /// initial one. The task is cancelled whatever the outcome.
    #[instrument(skip(self, description))]
    pub async fn check_status_integrity(
        &self,
        description: &str,
    ) -> Result<StatusIntegrityReport, ProbeError> {
        if self.concurrent_reads == 0 {
            return Err(ProbeError::NoRuns);
        }

        let submission = self.api.submit_task(description).await?;
        let task_id = submission.task_id().to_string();

        let outcome = self.read_around_burst(&task_id).await;
        safely_cancel(self.api.as_ref(), &task_id).await;
        let (initial, concurrent, final_status) = outcome?;

        let passed = final_status == initial && concurrent.iter().all(Option::is_some);
        if !passed {
            warn!(%initial, %final_status, "status changed under concurrent reads");
        }

        Ok(StatusIntegrityReport {
            task_id,
            initial,
            concurrent,
            final_status,
            passed,
        })
    }

    async fn read_around_burst(
        &self,
        task_id: &str,
    ) -> Result<(TaskStatus, Vec<Option<TaskStatus>>, TaskStatus), ProbeError> {
        let initial = self.api.get_task_status(task_id).await?.status;

        let burst = join_all(
            (0..self.concurrent_reads).map(|_| self.api.get_task_status(task_id)),
        )
        .await;
        let concurrent = burst
            .into_iter()
            .map(|read| match read {
                Ok(snapshot) => Some(snapshot.status),
                Err(err) => {
                    warn!(task_id, error = %err, "concurrent status read failed");
                    None
                }
            })
            .collect();

        let final_status = self.api.get_task_status(task_id).await?.status;
        Ok((initial, concurrent, final_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn test_outcome_from_error() {
        assert_eq!(
            InputOutcome::from_error(&status(400)),
            InputOutcome::Rejected { status: 400 }
        );
        assert_eq!(
            InputOutcome::from_error(&status(502)),
            InputOutcome::ServerError { status: 502 }
        );

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            InputOutcome::from_error(&ApiError::Decode(decode)),
            InputOutcome::Failed { .. }
        ));
    }

    #[test]
    fn test_graceful_outcomes() {
        assert!(InputOutcome::RateLimited.is_graceful());
        assert!(InputOutcome::Rejected { status: 422 }.is_graceful());
        assert!(!InputOutcome::ServerError { status: 500 }.is_graceful());
        assert!(!InputOutcome::Failed {
            error: "connection reset".to_string()
        }
        .is_graceful());
    }
}
