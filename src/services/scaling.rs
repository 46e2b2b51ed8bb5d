//! Concurrent submission probes: scaling ladder and per-task latency.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use super::consistency::safely_cancel;
use crate::domain::errors::ProbeError;
use crate::domain::models::{
    sample_tasks::cycled_descriptions, Complexity, ProbeConfig, Submission, SAMPLE_TASKS,
};
use crate::domain::ports::TaskApi;

/// Timing of one batch of concurrent submissions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepMeasurement {
    pub concurrency: usize,
    pub total_ms: f64,
    /// Total wall time divided by the batch size
    pub average_ms: f64,
    pub accepted: usize,
    pub rate_limited: usize,
    pub failed: usize,
}

/// Result of a scaling ladder
#[derive(Debug, Clone, Serialize)]
pub struct ScalingReport {
    pub steps: Vec<StepMeasurement>,
    /// `average_ms` of each step divided by the previous step's
    pub degradation: Vec<f64>,
    pub max_degradation: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SampleOutcome {
    Accepted { task_id: String },
    RateLimited,
    Failed(String),
}

/// Submission latency of one sample task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySample {
    pub name: &'static str,
    pub complexity: Complexity,
    pub latency_ms: f64,
    pub outcome: SampleOutcome,
    pub slow: bool,
}

/// Result of the latency probe
#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    pub threshold_ms: u64,
    pub samples: Vec<LatencySample>,
    pub passed: bool,
}

/// Fans submissions out concurrently and measures how the service keeps up
pub struct ScalingProbe<A: TaskApi + ?Sized> {
    api: Arc<A>,
    max_degradation: f64,
    response_time_threshold: Duration,
}

impl<A: TaskApi + ?Sized> ScalingProbe<A> {
    pub fn new(api: Arc<A>, max_degradation: f64, response_time_threshold: Duration) -> Self {
        Self {
            api,
            max_degradation,
            response_time_threshold,
        }
    }

    pub fn from_config(api: Arc<A>, config: &ProbeConfig) -> Self {
        Self::new(
            api,
            config.max_degradation,
            Duration::from_millis(config.response_time_threshold_ms),
        )
    }

    /// Submit `concurrency` sample descriptions at once, then cancel them all
    #[instrument(skip(self))]
    pub async fn measure_step(&self, concurrency: usize) -> StepMeasurement {
        let descriptions = cycled_descriptions(concurrency);
        let started = Instant::now();
        let outcomes = join_all(
            descriptions
                .iter()
                .map(|description| self.api.submit_task(description)),
        )
        .await;
        let total = started.elapsed();

        let mut measurement = StepMeasurement {
            concurrency,
            total_ms: millis(total),
            average_ms: if concurrency == 0 {
                0.0
            } else {
                millis(total) / concurrency as f64
            },
            accepted: 0,
            rate_limited: 0,
            failed: 0,
        };

        let mut accepted_ids = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Submission::Accepted(handle)) => {
                    measurement.accepted += 1;
                    accepted_ids.push(handle.task_id);
                }
                Ok(Submission::RateLimited) => measurement.rate_limited += 1,
                Err(err) => {
                    warn!(concurrency, error = %err, "submission failed");
                    measurement.failed += 1;
                }
            }
        }

        self.cancel_all(&accepted_ids).await;

        info!(
            concurrency,
            total_ms = measurement.total_ms,
            average_ms = measurement.average_ms,
            failed = measurement.failed,
            "step measured"
        );
        measurement
    }

    /// Measure steps `step, 2*step, ...` up to `max` and compare neighbours
    #[instrument(skip(self))]
    pub async fn run_ladder(&self, step: usize, max: usize) -> Result<ScalingReport, ProbeError> {
        if step == 0 || max < step {
            return Err(ProbeError::NoRuns);
        }

        let mut steps = Vec::new();
        for concurrency in (step..=max).step_by(step) {
            steps.push(self.measure_step(concurrency).await);
        }

        let degradation: Vec<f64> = steps
            .windows(2)
            .map(|pair| degradation_factor(pair[0].average_ms, pair[1].average_ms))
            .collect();
        let passed = degradation
            .iter()
            .all(|factor| *factor < self.max_degradation);

        Ok(ScalingReport {
            steps,
            degradation,
            max_degradation: self.max_degradation,
            passed,
        })
    }

    /// Submit every sample task at once and time each submission
    #[instrument(skip(self))]
    pub async fn measure_latency(&self) -> LatencyReport {
        let timed = join_all(SAMPLE_TASKS.iter().map(|task| async move {
            let started = Instant::now();
            let outcome = self.api.submit_task(task.description).await;
            (task, started.elapsed(), outcome)
        }))
        .await;

        let mut samples = Vec::with_capacity(timed.len());
        let mut accepted_ids = Vec::new();
        for (task, elapsed, outcome) in timed {
            let outcome = match outcome {
                Ok(Submission::Accepted(handle)) => {
                    accepted_ids.push(handle.task_id.clone());
                    SampleOutcome::Accepted {
                        task_id: handle.task_id,
                    }
                }
                Ok(Submission::RateLimited) => SampleOutcome::RateLimited,
                Err(err) => SampleOutcome::Failed(err.to_string()),
            };
            let slow = elapsed > self.response_time_threshold;
            if slow {
                warn!(task = task.name, latency_ms = millis(elapsed), "slow submission");
            }
            samples.push(LatencySample {
                name: task.name,
                complexity: task.complexity,
                latency_ms: millis(elapsed),
                outcome,
                slow,
            });
        }

        self.cancel_all(&accepted_ids).await;

        let passed = samples
            .iter()
            .all(|sample| !sample.slow && !matches!(sample.outcome, SampleOutcome::Failed(_)));

        LatencyReport {
            threshold_ms: self.response_time_threshold.as_millis() as u64,
            samples,
            passed,
        }
    }

    async fn cancel_all(&self, task_ids: &[String]) {
        join_all(
            task_ids
                .iter()
                .map(|task_id| safely_cancel(self.api.as_ref(), task_id)),
        )
        .await;
    }
}

/// Ratio of consecutive step averages; a zero baseline counts as no change
fn degradation_factor(previous_ms: f64, current_ms: f64) -> f64 {
    if previous_ms <= 0.0 {
        1.0
    } else {
        current_ms / previous_ms
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
