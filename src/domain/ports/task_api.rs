use async_trait::async_trait;

use crate::domain::errors::ApiError;
use crate::domain::models::{Cancellation, Submission, TaskSnapshot};

/// Task operations of the remote service.
///
/// The poller and the harness scenarios depend on this port rather than on
/// the HTTP client, so they can run against scripted implementations.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Submit a task description.
    async fn submit_task(&self, description: &str) -> Result<Submission, ApiError>;

    /// Read the current status of a task.
    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError>;

    /// Request cancellation of a task.
    async fn cancel_task(&self, task_id: &str) -> Result<Cancellation, ApiError>;
}
