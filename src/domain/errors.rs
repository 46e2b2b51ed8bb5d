//! Error types for remote calls, polling and harness scenarios.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a single remote call (after retries).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status the operation has no mapping for
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured base URL cannot address the API
    #[error("Invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// Returns true if the failure may go away on its own and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::REQUEST_TIMEOUT
            }
            Self::Decode(_) | Self::InvalidUrl { .. } => false,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Network(err) => err.status(),
            Self::Status { status, .. } => Some(*status),
            Self::Decode(_) | Self::InvalidUrl { .. } => None,
        }
    }
}

/// Errors produced while waiting for a task to settle.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Task {task_id} failed: {detail}")]
    TaskFailed { task_id: String, detail: String },

    #[error("Task {task_id} timed out after {}ms", .elapsed.as_millis())]
    TimedOut { task_id: String, elapsed: Duration },

    #[error("Task {task_id} not found")]
    NotFound { task_id: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PollError {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskFailed { task_id, .. }
            | Self::TimedOut { task_id, .. }
            | Self::NotFound { task_id } => Some(task_id),
            Self::Api(_) => None,
        }
    }
}

/// Errors produced by harness scenarios.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Run {run} did not settle: {source}")]
    Poll {
        run: usize,
        #[source]
        source: PollError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Scenario requires at least one run")]
    NoRuns,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(code: u16) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(status_error(500).is_transient());
        assert!(status_error(502).is_transient());
        assert!(status_error(503).is_transient());
        assert!(status_error(408).is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        assert!(!status_error(400).is_transient());
        assert!(!status_error(401).is_transient());
        assert!(!status_error(422).is_transient());
    }

    #[test]
    fn test_decode_error_is_not_transient() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let api_err: ApiError = err.into();
        assert!(!api_err.is_transient());
        assert!(api_err.status().is_none());
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(
            status_error(503).status(),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[test]
    fn test_poll_error_display() {
        let err = PollError::TaskFailed {
            task_id: "t-1".to_string(),
            detail: "Unknown error".to_string(),
        };
        assert_eq!(err.to_string(), "Task t-1 failed: Unknown error");

        let err = PollError::TimedOut {
            task_id: "t-2".to_string(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Task t-2 timed out after 1500ms");
        assert_eq!(err.task_id(), Some("t-2"));
    }
}
