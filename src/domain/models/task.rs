//! Remote task domain model.
//!
//! A task is one unit of work submitted to the remote service. Its status is
//! owned by the remote side; the harness only ever re-reads it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier handed out for a submission the remote service rate-limited.
///
/// Status reads for this id are answered locally and never reach the network.
pub const RATE_LIMITED_TASK_ID: &str = "rate-limited-mock-task";

/// Lifecycle status of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted by the remote service, not started yet
    Queued,
    /// Being worked on
    Processing,
    /// Finished with a result payload
    Completed,
    /// Finished with an error
    Failed,
    /// The remote service does not know the task id
    NotFound,
    /// The remote service throttled the request
    RateLimited,
    /// Any status string this harness does not recognize
    #[serde(other)]
    Other,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Other => "other",
        }
    }

    /// Check if no further transition can happen without a new submission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::NotFound)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by the remote service for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
    pub url: Option<String>,
}

/// Outcome of a submit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Submission {
    /// The remote service created a task
    Accepted(TaskHandle),
    /// The remote service answered 429; nothing was created
    RateLimited,
}

impl Submission {
    /// Id to poll or cancel for this submission.
    pub fn task_id(&self) -> &str {
        match self {
            Self::Accepted(handle) => &handle.task_id,
            Self::RateLimited => RATE_LIMITED_TASK_ID,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// One status read of a remote task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot {
    /// Snapshot for a task id the remote service answered 404 for.
    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::NotFound,
            result: None,
            error: None,
        }
    }

    /// Locally synthesized snapshot for [`RATE_LIMITED_TASK_ID`].
    pub fn rate_limited_mock() -> Self {
        Self {
            task_id: RATE_LIMITED_TASK_ID.to_string(),
            status: TaskStatus::Completed,
            result: Some(serde_json::json!({
                "mock": true,
                "reason": "rate_limited",
                "output": "Request was rate limited; no remote task was created",
            })),
            error: None,
        }
    }
}

/// Outcome of a cancel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cancellation {
    Cancelled,
    /// The task was already gone (404), which cancellation accepts
    AlreadyGone,
}

/// Result of reading an optional capability of the remote deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "availability", content = "payload", rename_all = "snake_case")]
pub enum Availability<T> {
    Available(T),
    /// Endpoint answered 404 or its host did not resolve
    Unavailable,
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}
