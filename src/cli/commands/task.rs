//! Single-task CLI commands: submit, status, cancel, wait, run.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

use crate::cli::output::{
    create_spinner_with_message, output, render_value, CommandOutput, ProgressBarExt,
    TableFormatter,
};
use crate::domain::models::{Cancellation, Submission, TaskSnapshot};
use crate::infrastructure::api::RemoteTaskClient;
use crate::services::{PollSettings, TaskPoller};

#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub task_id: String,
    pub rate_limited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<Submission> for SubmitOutput {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Accepted(handle) => Self {
                task_id: handle.task_id,
                rate_limited: false,
                url: handle.url,
            },
            Submission::RateLimited => Self {
                task_id: submission.task_id().to_string(),
                rate_limited: true,
                url: None,
            },
        }
    }
}

impl CommandOutput for SubmitOutput {
    fn to_human(&self) -> String {
        if self.rate_limited {
            return format!(
                "Submission was rate limited; placeholder id: {}",
                self.task_id
            );
        }
        let mut lines = vec![format!("Task submitted: {}", self.task_id)];
        if let Some(url) = &self.url {
            lines.push(format!("URL: {url}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotOutput {
    #[serde(flatten)]
    pub snapshot: TaskSnapshot,
}

impl CommandOutput for SnapshotOutput {
    fn to_human(&self) -> String {
        let mut text = TableFormatter::new().format_snapshot(&self.snapshot);
        if let Some(result) = &self.snapshot.result {
            text.push_str("\n\nResult:\n");
            text.push_str(&render_value(result));
        }
        text
    }
}

#[derive(Debug, Serialize)]
pub struct CancelOutput {
    pub task_id: String,
    pub outcome: Cancellation,
}

impl CommandOutput for CancelOutput {
    fn to_human(&self) -> String {
        match self.outcome {
            Cancellation::Cancelled => format!("Task {} cancelled", self.task_id),
            Cancellation::AlreadyGone => format!("Task {} already gone", self.task_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WaitOutput {
    pub task_id: String,
    pub result: Value,
    pub elapsed_ms: u64,
}

impl CommandOutput for WaitOutput {
    fn to_human(&self) -> String {
        format!(
            "Task {} completed in {}ms\n\nResult:\n{}",
            self.task_id,
            self.elapsed_ms,
            render_value(&self.result)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub task_id: String,
    pub rate_limited: bool,
    pub result: Value,
    pub elapsed_ms: u64,
    /// `None` when the task was kept
    pub cancellation: Option<Cancellation>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Task {} completed in {}ms", self.task_id, self.elapsed_ms)];
        if self.rate_limited {
            lines.push("Submission was rate limited; result is a local placeholder".to_string());
        }
        match self.cancellation {
            Some(Cancellation::Cancelled) => lines.push("Task cancelled".to_string()),
            Some(Cancellation::AlreadyGone) => lines.push("Task already gone".to_string()),
            None => lines.push("Task kept".to_string()),
        }
        lines.push(String::new());
        lines.push("Result:".to_string());
        lines.push(render_value(&self.result));
        lines.join("\n")
    }
}

pub async fn handle_submit(client: &RemoteTaskClient, description: &str, json: bool) -> Result<()> {
    let submission = client
        .submit_task(description)
        .await
        .context("Failed to submit task")?;

    output(&SubmitOutput::from(submission), json);
    Ok(())
}

pub async fn handle_status(client: &RemoteTaskClient, task_id: &str, json: bool) -> Result<()> {
    let snapshot = client
        .get_task_status(task_id)
        .await
        .with_context(|| format!("Failed to read status of task {task_id}"))?;

    output(&SnapshotOutput { snapshot }, json);
    Ok(())
}

pub async fn handle_cancel(client: &RemoteTaskClient, task_id: &str, json: bool) -> Result<()> {
    let outcome = client
        .cancel_task(task_id)
        .await
        .with_context(|| format!("Failed to cancel task {task_id}"))?;

    output(
        &CancelOutput {
            task_id: task_id.to_string(),
            outcome,
        },
        json,
    );
    Ok(())
}

pub async fn handle_wait(
    client: Arc<RemoteTaskClient>,
    settings: PollSettings,
    task_id: &str,
    json: bool,
) -> Result<()> {
    let poller = TaskPoller::new(client, settings);
    let spinner = create_spinner_with_message(format!("Waiting for task {task_id}"), json);
    let started = Instant::now();

    let result = match poller.poll_until_terminal(task_id).await {
        Ok(result) => {
            spinner.finish_success(format!("Task {task_id} completed"));
            result
        }
        Err(err) => {
            spinner.finish_error(format!("Task {task_id} did not complete"));
            return Err(err.into());
        }
    };

    output(
        &WaitOutput {
            task_id: task_id.to_string(),
            result,
            elapsed_ms: started.elapsed().as_millis() as u64,
        },
        json,
    );
    Ok(())
}

pub async fn handle_run(
    client: Arc<RemoteTaskClient>,
    settings: PollSettings,
    description: &str,
    keep: bool,
    json: bool,
) -> Result<()> {
    let submission = client
        .submit_task(description)
        .await
        .context("Failed to submit task")?;
    let task_id = submission.task_id().to_string();

    let poller = TaskPoller::new(Arc::clone(&client), settings);
    let spinner = create_spinner_with_message(format!("Waiting for task {task_id}"), json);
    let started = Instant::now();
    let polled = poller.poll_until_terminal(&task_id).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let cancellation = if keep {
        None
    } else {
        crate::services::safely_cancel(client.as_ref(), &task_id).await
    };

    let result = match polled {
        Ok(result) => {
            spinner.finish_success(format!("Task {task_id} completed"));
            result
        }
        Err(err) => {
            spinner.finish_error(format!("Task {task_id} did not complete"));
            return Err(err.into());
        }
    };

    output(
        &RunOutput {
            task_id,
            rate_limited: submission.is_rate_limited(),
            result,
            elapsed_ms,
            cancellation,
        },
        json,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{TaskHandle, RATE_LIMITED_TASK_ID};

    #[test]
    fn test_submit_output_from_accepted() {
        let out = SubmitOutput::from(Submission::Accepted(TaskHandle {
            task_id: "t-1".to_string(),
            url: Some("https://example.test/t-1".to_string()),
        }));
        let json = out.to_json();
        assert_eq!(json["task_id"], "t-1");
        assert_eq!(json["rate_limited"], false);
        assert!(out.to_human().contains("URL: https://example.test/t-1"));
    }

    #[test]
    fn test_submit_output_from_rate_limited() {
        let out = SubmitOutput::from(Submission::RateLimited);
        assert_eq!(out.task_id, RATE_LIMITED_TASK_ID);
        assert_eq!(out.to_json()["rate_limited"], true);
        assert!(out.to_json().get("url").is_none());
        assert!(out.to_human().contains(RATE_LIMITED_TASK_ID));
    }

    #[test]
    fn test_cancel_output_human() {
        let out = CancelOutput {
            task_id: "t-2".to_string(),
            outcome: Cancellation::AlreadyGone,
        };
        assert_eq!(out.to_human(), "Task t-2 already gone");
        assert_eq!(out.to_json()["outcome"], "already_gone");
    }
}
