//! Read-only observability commands: metrics, logs, admin status.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{output, render_value, CommandOutput};
use crate::domain::models::Availability;
use crate::infrastructure::api::RemoteTaskClient;

#[derive(Debug, Serialize)]
pub struct EndpointOutput {
    pub endpoint: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EndpointOutput {
    fn new(endpoint: &'static str, availability: Availability<Value>) -> Self {
        Self {
            endpoint,
            available: availability.is_available(),
            payload: availability.into_option().filter(|value| !value.is_null()),
        }
    }
}

impl CommandOutput for EndpointOutput {
    fn to_human(&self) -> String {
        match &self.payload {
            Some(payload) => format!("{}:\n{}", self.endpoint, render_value(payload)),
            None if self.available => format!("{}: (empty)", self.endpoint),
            None => format!("{}: unavailable on this deployment", self.endpoint),
        }
    }
}

pub async fn handle_metrics(client: &RemoteTaskClient, json: bool) -> Result<()> {
    let availability = client.get_metrics().await.context("Failed to read metrics")?;
    output(&EndpointOutput::new("metrics", availability), json);
    Ok(())
}

pub async fn handle_logs(client: &RemoteTaskClient, json: bool) -> Result<()> {
    let availability = client.get_logs().await.context("Failed to read logs")?;
    output(&EndpointOutput::new("logs", availability), json);
    Ok(())
}

pub async fn handle_admin_status(client: &RemoteTaskClient, json: bool) -> Result<()> {
    let availability = client
        .get_admin_status()
        .await
        .context("Failed to read admin status")?;
    output(&EndpointOutput::new("admin status", availability), json);
    Ok(())
}
