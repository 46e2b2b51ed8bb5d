//! CLI command implementations.

pub mod config;
pub mod observe;
pub mod probe;
pub mod task;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::types::{Commands, ConfigCommands};
use crate::domain::models::{Config, CONSISTENCY_TASK, INTEGRITY_TASK};
use crate::infrastructure::api::RemoteTaskClient;
use crate::infrastructure::logging::SecretScrubber;
use crate::services::PollSettings;

/// Run one parsed command against the given configuration
pub async fn execute(
    command: Commands,
    config: &Config,
    scrubber: &SecretScrubber,
    json: bool,
) -> Result<()> {
    // Local-only commands never build an HTTP client
    match &command {
        Commands::Similarity { left, right } => {
            return probe::handle_similarity(left, right, json);
        }
        Commands::Config(ConfigCommands::Show) => {
            return self::config::handle_show(config, scrubber, json);
        }
        _ => {}
    }

    let client = Arc::new(RemoteTaskClient::new(config).context("Failed to build HTTP client")?);
    let settings = PollSettings::from_config(&config.polling);

    match command {
        Commands::Submit { description } => task::handle_submit(&client, &description, json).await,
        Commands::Status { task_id } => task::handle_status(&client, &task_id, json).await,
        Commands::Cancel { task_id } => task::handle_cancel(&client, &task_id, json).await,
        Commands::Wait {
            task_id,
            interval_ms,
            timeout_ms,
        } => {
            let settings = PollSettings::new(
                interval_ms.map_or(settings.interval, Duration::from_millis),
                timeout_ms.map_or(settings.timeout, Duration::from_millis),
            );
            task::handle_wait(client, settings, &task_id, json).await
        }
        Commands::Run { description, keep } => {
            task::handle_run(client, settings, &description, keep, json).await
        }
        Commands::Metrics => observe::handle_metrics(&client, json).await,
        Commands::Logs => observe::handle_logs(&client, json).await,
        Commands::AdminStatus => observe::handle_admin_status(&client, json).await,
        Commands::Consistency {
            description,
            iterations,
            threshold,
        } => {
            let mut probe_config = config.probe.clone();
            if let Some(iterations) = iterations {
                probe_config.iterations = iterations;
            }
            if let Some(threshold) = threshold {
                probe_config.consistency_threshold = threshold;
            }
            let description = description.as_deref().unwrap_or(CONSISTENCY_TASK);
            probe::handle_consistency(client, settings, &probe_config, description, json).await
        }
        Commands::Scale { step, max } => {
            let step = step.unwrap_or(config.probe.step_size);
            let max = max.unwrap_or(config.probe.max_concurrent);
            probe::handle_scale(client, &config.probe, step, max, json).await
        }
        Commands::Latency => probe::handle_latency(client, &config.probe, json).await,
        Commands::MalformedInput => probe::handle_malformed_input(client, &config.probe, json).await,
        Commands::StatusIntegrity { description, reads } => {
            let mut probe_config = config.probe.clone();
            if let Some(reads) = reads {
                probe_config.concurrent_status_reads = reads;
            }
            let description = description.as_deref().unwrap_or(INTEGRITY_TASK);
            probe::handle_status_integrity(client, &probe_config, description, json).await
        }
        Commands::Similarity { .. } | Commands::Config(_) => Ok(()),
    }
}
