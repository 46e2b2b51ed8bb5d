//! Wire types of the remote task API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::models::{TaskHandle, TaskSnapshot, TaskStatus};

/// Body of `POST /v1/sessions`
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub prompt: &'a str,
    pub snapshot_id: Option<&'a str>,
}

/// Response of `POST /v1/sessions`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<CreateSessionResponse> for TaskHandle {
    fn from(response: CreateSessionResponse) -> Self {
        Self {
            task_id: response.session_id,
            url: response.url,
        }
    }
}

/// Response of `GET /v1/sessions/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<Value>,
    /// Plain message or a structured error object
    #[serde(default)]
    pub error: Option<Value>,
}

impl SessionStatusResponse {
    pub fn into_snapshot(self, task_id: &str) -> TaskSnapshot {
        TaskSnapshot {
            task_id: task_id.to_string(),
            status: self.status,
            // Some deployments send `"result": null` while still running
            result: self.result.filter(|value| !value.is_null()),
            error: self.error.and_then(error_detail),
        }
    }
}

fn error_detail(error: Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(message) => Some(message),
        other => Some(other.to_string()),
    }
}
