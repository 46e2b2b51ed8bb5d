//! Common test utilities for integration tests
//!
//! Provides an in-memory [`TaskApi`] whose answers are scripted per task id.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use taskprobe::{
    ApiError, Cancellation, Submission, TaskApi, TaskHandle, TaskSnapshot, TaskStatus,
    RATE_LIMITED_TASK_ID,
};

/// Snapshot with the given status and no payload
pub fn snapshot(task_id: &str, status: TaskStatus) -> TaskSnapshot {
    TaskSnapshot {
        task_id: task_id.to_string(),
        status,
        result: None,
        error: None,
    }
}

pub fn completed(task_id: &str, result: Value) -> TaskSnapshot {
    TaskSnapshot {
        result: Some(result),
        ..snapshot(task_id, TaskStatus::Completed)
    }
}

pub fn failed(task_id: &str, error: Option<&str>) -> TaskSnapshot {
    TaskSnapshot {
        error: error.map(str::to_string),
        ..snapshot(task_id, TaskStatus::Failed)
    }
}

/// Scripted task API
///
/// Submissions hand out `task-1`, `task-2`, ... unless rate limiting is
/// switched on. Status reads pop the next scripted snapshot for the id; the
/// last snapshot repeats forever.
#[derive(Default)]
pub struct ScriptedApi {
    statuses: Mutex<HashMap<String, VecDeque<TaskSnapshot>>>,
    submit_delay: Option<Duration>,
    status_delay: Option<Duration>,
    rate_limit_submissions: bool,
    fail_cancels: bool,
    fail_status_reads: bool,
    submit_errors: Vec<(fn(&str) -> bool, u16)>,
    submitted: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
    status_reads: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, task_id: &str, statuses: Vec<TaskSnapshot>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(task_id.to_string(), statuses.into());
        self
    }

    /// Every submission takes `delay` of (tokio) time
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// Every status read takes `delay` of (tokio) time
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    /// Status reads fail with a 503, as after an exhausted retry budget
    pub fn failing_status(mut self) -> Self {
        self.fail_status_reads = true;
        self
    }

    /// Submissions whose description matches `when` fail with `status`
    pub fn rejecting(mut self, when: fn(&str) -> bool, status: u16) -> Self {
        self.submit_errors.push((when, status));
        self
    }

    pub fn rate_limited(mut self) -> Self {
        self.rate_limit_submissions = true;
        self
    }

    pub fn failing_cancels(mut self) -> Self {
        self.fail_cancels = true;
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskApi for ScriptedApi {
    async fn submit_task(&self, description: &str) -> Result<Submission, ApiError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((_, status)) = self.submit_errors.iter().find(|(when, _)| when(description)) {
            return Err(ApiError::Status {
                status: reqwest::StatusCode::from_u16(*status).unwrap(),
                body: String::new(),
            });
        }
        if self.rate_limit_submissions {
            return Ok(Submission::RateLimited);
        }

        let mut submitted = self.submitted.lock().unwrap();
        let task_id = format!("task-{}", submitted.len() + 1);
        submitted.push(task_id.clone());
        drop(submitted);

        // Unscripted tasks complete immediately with their description
        self.statuses
            .lock()
            .unwrap()
            .entry(task_id.clone())
            .or_insert_with(|| {
                VecDeque::from(vec![completed(&task_id, Value::String(description.to_string()))])
            });

        Ok(Submission::Accepted(TaskHandle { task_id, url: None }))
    }

    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        self.status_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_status_reads {
            return Err(ApiError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "Service Unavailable".to_string(),
            });
        }
        if task_id == RATE_LIMITED_TASK_ID {
            return Ok(TaskSnapshot::rate_limited_mock());
        }

        let mut statuses = self.statuses.lock().unwrap();
        let Some(queue) = statuses.get_mut(task_id) else {
            return Ok(TaskSnapshot::not_found(task_id));
        };
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(next.unwrap_or_else(|| TaskSnapshot::not_found(task_id)))
    }

    async fn cancel_task(&self, task_id: &str) -> Result<Cancellation, ApiError> {
        self.cancelled.lock().unwrap().push(task_id.to_string());
        if self.fail_cancels {
            let err = serde_json::from_str::<Value>("not json").unwrap_err();
            return Err(ApiError::Decode(err));
        }
        Ok(Cancellation::Cancelled)
    }
}
