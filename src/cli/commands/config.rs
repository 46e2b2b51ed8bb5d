//! Configuration CLI commands.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::logging::SecretScrubber;

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    rendered: String,
}

impl ConfigOutput {
    /// Copy of `config` with the auth token replaced, plus a scrubbed YAML rendering
    pub fn redacted(config: &Config, scrubber: &SecretScrubber) -> Result<Self> {
        let mut config = config.clone();
        if config.api.auth_token.is_some() {
            config.api.auth_token = Some(REDACTED.to_string());
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;

        Ok(Self {
            rendered: scrubber.scrub(&yaml),
            config,
        })
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        self.rendered.trim_end().to_string()
    }
}

pub fn handle_show(config: &Config, scrubber: &SecretScrubber, json: bool) -> Result<()> {
    output(&ConfigOutput::redacted(config, scrubber)?, json);
    Ok(())
}
