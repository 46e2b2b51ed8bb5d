use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} cannot be empty")]
    EmptyUrl { field: &'static str },

    #[error("Invalid {field}: {value}. Must start with http:// or https://")]
    InvalidUrlScheme { field: &'static str, value: String },

    #[error("Invalid request_timeout_ms: {0}. Must be at least 1")]
    InvalidRequestTimeout(u64),

    #[error("Invalid poll interval_ms: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid poll timeout_ms ({timeout_ms}): must be >= interval_ms ({interval_ms})")]
    InvalidPollTimeout { timeout_ms: u64, interval_ms: u64 },

    #[error("Invalid {field}: {value}. Must start with '/'")]
    InvalidEndpointPath { field: &'static str, value: String },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid iterations: {0}. Must be at least 1")]
    InvalidIterations(u32),

    #[error("Invalid consistency_threshold: {0}. Must be between 0 and 1")]
    InvalidConsistencyThreshold(f64),

    #[error("Invalid step_size: {0}. Must be at least 1")]
    InvalidStepSize(usize),

    #[error("Invalid concurrent_status_reads: {0}. Must be at least 1")]
    InvalidConcurrentStatusReads(usize),

    #[error("Invalid step_size ({step_size}): must not exceed max_concurrent ({max_concurrent})")]
    StepLargerThanMax {
        step_size: usize,
        max_concurrent: usize,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .taskprobe/config.yaml (project config)
    /// 3. .taskprobe/local.yaml (local overrides, optional)
    /// 4. Environment variables (TASKPROBE_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".taskprobe/config.yaml"))
            .merge(Yaml::file(".taskprobe/local.yaml"))
            .merge(Env::prefixed("TASKPROBE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TASKPROBE_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        validate_url("api.base_url", &config.api.base_url)?;
        validate_url("admin.base_url", &config.admin.base_url)?;

        if config.api.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidRequestTimeout(
                config.api.request_timeout_ms,
            ));
        }

        if config.polling.interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(config.polling.interval_ms));
        }

        if config.polling.timeout_ms < config.polling.interval_ms {
            return Err(ConfigError::InvalidPollTimeout {
                timeout_ms: config.polling.timeout_ms,
                interval_ms: config.polling.interval_ms,
            });
        }

        validate_endpoint(
            "observability.metrics_endpoint",
            &config.observability.metrics_endpoint,
        )?;
        validate_endpoint(
            "observability.logs_endpoint",
            &config.observability.logs_endpoint,
        )?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let probe = &config.probe;
        if probe.iterations == 0 {
            return Err(ConfigError::InvalidIterations(probe.iterations));
        }

        if !(0.0..=1.0).contains(&probe.consistency_threshold) {
            return Err(ConfigError::InvalidConsistencyThreshold(
                probe.consistency_threshold,
            ));
        }

        if probe.step_size == 0 {
            return Err(ConfigError::InvalidStepSize(probe.step_size));
        }

        if probe.step_size > probe.max_concurrent {
            return Err(ConfigError::StepLargerThanMax {
                step_size: probe.step_size,
                max_concurrent: probe.max_concurrent,
            });
        }

        if probe.concurrent_status_reads == 0 {
            return Err(ConfigError::InvalidConcurrentStatusReads(
                probe.concurrent_status_reads,
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyUrl { field });
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidUrlScheme {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_endpoint(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpointPath {
            field,
            value: value.to_string(),
        })
    }
}
