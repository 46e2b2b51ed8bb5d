//! Repeat-submission consistency scenario.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::similarity::SimilarityMatrix;
use super::task_poller::{PollSettings, TaskPoller};
use crate::domain::errors::ProbeError;
use crate::domain::models::{Cancellation, ProbeConfig};
use crate::domain::ports::TaskApi;

/// Cancel a task, logging instead of returning any failure
pub async fn safely_cancel<A: TaskApi + ?Sized>(api: &A, task_id: &str) -> Option<Cancellation> {
    match api.cancel_task(task_id).await {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            warn!(task_id, error = %err, "failed to cancel task");
            None
        }
    }
}

/// Outcome of a consistency run
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub run_id: Uuid,
    pub description: String,
    pub iterations: u32,
    pub task_ids: Vec<String>,
    pub matrix: SimilarityMatrix,
    pub average: f64,
    pub threshold: f64,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
}

/// Submits one description repeatedly and scores how alike the results are
pub struct ConsistencyRunner<A: TaskApi + ?Sized> {
    api: Arc<A>,
    poller: TaskPoller<A>,
    iterations: u32,
    threshold: f64,
}

impl<A: TaskApi + ?Sized> ConsistencyRunner<A> {
    pub fn new(api: Arc<A>, settings: PollSettings, iterations: u32, threshold: f64) -> Self {
        let poller = TaskPoller::new(Arc::clone(&api), settings);
        Self {
            api,
            poller,
            iterations,
            threshold,
        }
    }

    pub fn from_config(api: Arc<A>, settings: PollSettings, config: &ProbeConfig) -> Self {
        Self::new(api, settings, config.iterations, config.consistency_threshold)
    }

    pub async fn run(&self, description: &str) -> Result<ConsistencyReport, ProbeError> {
        self.run_with_progress(description, |_| {}).await
    }

    /// Run the scenario, calling `on_run` with the number of finished runs
    ///
    /// Runs are sequential. Every submitted task is cancelled afterwards,
    /// whether or not the scenario succeeded.
    #[instrument(skip(self, description, on_run), fields(iterations = self.iterations))]
    pub async fn run_with_progress<F>(
        &self,
        description: &str,
        mut on_run: F,
    ) -> Result<ConsistencyReport, ProbeError>
    where
        F: FnMut(usize) + Send,
    {
        if self.iterations == 0 {
            return Err(ProbeError::NoRuns);
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut task_ids = Vec::with_capacity(self.iterations as usize);

        let outcome = self
            .collect_results(description, &mut task_ids, &mut on_run)
            .await;

        for task_id in &task_ids {
            safely_cancel(self.api.as_ref(), task_id).await;
        }

        let results = outcome?;
        let matrix = SimilarityMatrix::from_results(&results);
        let average = matrix.average();
        let passed = average > self.threshold;

        info!(%run_id, average, threshold = self.threshold, passed, "consistency run finished");

        Ok(ConsistencyReport {
            run_id,
            description: description.to_string(),
            iterations: self.iterations,
            task_ids,
            matrix,
            average,
            threshold: self.threshold,
            passed,
            started_at,
        })
    }

    async fn collect_results<F>(
        &self,
        description: &str,
        task_ids: &mut Vec<String>,
        on_run: &mut F,
    ) -> Result<Vec<Value>, ProbeError>
    where
        F: FnMut(usize) + Send,
    {
        let mut results = Vec::with_capacity(self.iterations as usize);

        for run in 0..self.iterations as usize {
            let submission = self.api.submit_task(description).await?;
            let task_id = submission.task_id().to_string();
            task_ids.push(task_id.clone());

            let result = self
                .poller
                .poll_until_terminal(&task_id)
                .await
                .map_err(|source| ProbeError::Poll { run, source })?;
            results.push(result);
            on_run(run + 1);
        }

        Ok(results)
    }
}
