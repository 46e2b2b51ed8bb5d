//! Harness scenario commands: consistency, scale, latency, fault tolerance, similarity.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::cli::output::{
    create_progress_bar, create_spinner_with_message, output, render_value, truncate,
    CommandOutput, ProgressBarExt, TableFormatter,
};
use crate::domain::models::ProbeConfig;
use crate::infrastructure::api::RemoteTaskClient;
use crate::services::{
    similarity, ConsistencyReport, ConsistencyRunner, FaultToleranceProbe, LatencyReport,
    MalformedInputReport, PollSettings, ScalingProbe, ScalingReport, StatusIntegrityReport,
};

impl CommandOutput for ConsistencyReport {
    fn to_human(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "Consistency run {} ({} runs of \"{}\")\n\n{}\n\nAverage similarity: {:.3} (threshold {:.3}) {}",
            self.run_id,
            self.iterations,
            truncate(&self.description, 60),
            TableFormatter::new().format_similarity_matrix(&self.matrix),
            self.average,
            self.threshold,
            verdict
        )
    }
}

impl CommandOutput for ScalingReport {
    fn to_human(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "{}\n\nMax accepted degradation: {:.2}x {}",
            TableFormatter::new().format_scaling_steps(&self.steps, &self.degradation),
            self.max_degradation,
            verdict
        )
    }
}

impl CommandOutput for LatencyReport {
    fn to_human(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "{}\n\nThreshold: {}ms {}",
            TableFormatter::new().format_latency_samples(&self.samples),
            self.threshold_ms,
            verdict
        )
    }
}

impl CommandOutput for MalformedInputReport {
    fn to_human(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "{}\n\nMalformed input {}",
            TableFormatter::new().format_input_cases(&self.cases),
            verdict
        )
    }
}

impl CommandOutput for StatusIntegrityReport {
    fn to_human(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        let seen: Vec<&str> = self
            .concurrent
            .iter()
            .map(|status| status.map_or("error", |status| status.as_str()))
            .collect();
        format!(
            "Task {}\n  initial:    {}\n  concurrent: {}\n  final:      {}\n\nStatus integrity {}",
            self.task_id,
            self.initial,
            seen.join(", "),
            self.final_status,
            verdict
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarityOutput {
    pub left: Value,
    pub right: Value,
    pub score: f64,
}

impl CommandOutput for SimilarityOutput {
    fn to_human(&self) -> String {
        format!(
            "left:  {}\nright: {}\nsimilarity: {:.4}",
            render_value(&self.left),
            render_value(&self.right),
            self.score
        )
    }
}

pub async fn handle_consistency(
    client: Arc<RemoteTaskClient>,
    settings: PollSettings,
    config: &ProbeConfig,
    description: &str,
    json: bool,
) -> Result<()> {
    let runner = ConsistencyRunner::from_config(client, settings, config);
    let progress = create_progress_bar(u64::from(config.iterations), json);
    progress.set_message("runs");

    let report = match runner
        .run_with_progress(description, |finished| progress.set_position(finished as u64))
        .await
    {
        Ok(report) => report,
        Err(err) => {
            progress.finish_error("consistency run aborted");
            return Err(err).context("Consistency run failed");
        }
    };
    progress.finish_success(format!("{} runs finished", report.iterations));

    output(&report, json);
    if !report.passed {
        bail!(
            "Average similarity {:.3} is not above threshold {:.3}",
            report.average,
            report.threshold
        );
    }
    Ok(())
}

pub async fn handle_scale(
    client: Arc<RemoteTaskClient>,
    config: &ProbeConfig,
    step: usize,
    max: usize,
    json: bool,
) -> Result<()> {
    let probe = ScalingProbe::from_config(client, config);
    let spinner = create_spinner_with_message(format!("Measuring concurrency up to {max}"), json);

    let report = match probe.run_ladder(step, max).await {
        Ok(report) => report,
        Err(err) => {
            spinner.finish_error("scaling probe aborted");
            return Err(err).context("Scaling probe failed");
        }
    };
    spinner.finish_success(format!("{} steps measured", report.steps.len()));

    output(&report, json);
    if !report.passed {
        bail!(
            "Submission time degraded by more than {:.2}x between steps",
            report.max_degradation
        );
    }
    Ok(())
}

pub async fn handle_latency(
    client: Arc<RemoteTaskClient>,
    config: &ProbeConfig,
    json: bool,
) -> Result<()> {
    let probe = ScalingProbe::from_config(client, config);
    let spinner = create_spinner_with_message("Submitting sample tasks", json);
    let report = probe.measure_latency().await;
    spinner.finish_success(format!("{} samples measured", report.samples.len()));

    output(&report, json);
    if !report.passed {
        bail!(
            "At least one submission failed or took longer than {}ms",
            report.threshold_ms
        );
    }
    Ok(())
}

pub async fn handle_malformed_input(
    client: Arc<RemoteTaskClient>,
    config: &ProbeConfig,
    json: bool,
) -> Result<()> {
    let probe = FaultToleranceProbe::from_config(client, config);
    let spinner = create_spinner_with_message("Submitting malformed descriptions", json);
    let report = probe.check_malformed_inputs().await;
    spinner.finish_success(format!("{} inputs submitted", report.cases.len()));

    output(&report, json);
    if !report.passed {
        bail!("At least one malformed input caused a server error or got no answer");
    }
    Ok(())
}

pub async fn handle_status_integrity(
    client: Arc<RemoteTaskClient>,
    config: &ProbeConfig,
    description: &str,
    json: bool,
) -> Result<()> {
    let probe = FaultToleranceProbe::from_config(client, config);
    let spinner = create_spinner_with_message(
        format!("Reading status {} times concurrently", config.concurrent_status_reads),
        json,
    );

    let report = match probe.check_status_integrity(description).await {
        Ok(report) => report,
        Err(err) => {
            spinner.finish_error("status integrity check aborted");
            return Err(err).context("Status integrity check failed");
        }
    };
    spinner.finish_success(format!("{} concurrent reads", report.concurrent.len()));

    output(&report, json);
    if !report.passed {
        bail!(
            "Status of task {} changed from {} to {} under concurrent reads",
            report.task_id,
            report.initial,
            report.final_status
        );
    }
    Ok(())
}

pub fn handle_similarity(left: &str, right: &str, json: bool) -> Result<()> {
    let left = parse_operand(left);
    let right = parse_operand(right);
    let score = similarity(&left, &right);

    output(&SimilarityOutput { left, right, score }, json);
    Ok(())
}

/// Interpret a command-line operand as JSON when it parses, else as text
fn parse_operand(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
