use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for taskprobe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote task API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy applied to every remote call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Task polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// Optional metrics and logs endpoints
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Admin API settings
    #[serde(default)]
    pub admin: AdminConfig,

    /// Harness scenario thresholds
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote task API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the task API, without the `/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Snapshot identifier sent with every submission
    #[serde(default)]
    pub snapshot_id: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    60_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            request_timeout_ms: default_request_timeout_ms(),
            snapshot_id: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Task polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollingConfig {
    /// Delay between status reads in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on total polling time in milliseconds
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_poll_interval_ms() -> u64 {
    5000
}

const fn default_poll_timeout_ms() -> u64 {
    60_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_ms: default_poll_timeout_ms(),
        }
    }
}

/// Observability endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObservabilityConfig {
    /// Path of the metrics endpoint below `/v1`
    #[serde(default = "default_metrics_endpoint")]
    pub metrics_endpoint: String,

    /// Path of the logs endpoint below `/v1`
    #[serde(default = "default_logs_endpoint")]
    pub logs_endpoint: String,
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

fn default_logs_endpoint() -> String {
    "/logs".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_endpoint: default_metrics_endpoint(),
            logs_endpoint: default_logs_endpoint(),
        }
    }
}

/// Admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminConfig {
    /// Base URL of the admin API, without the `/v1` prefix
    #[serde(default = "default_admin_base_url")]
    pub base_url: String,
}

fn default_admin_base_url() -> String {
    "http://localhost:8081".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_admin_base_url(),
        }
    }
}

/// Thresholds and sizes for harness scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProbeConfig {
    /// Runs of the same task in a consistency check
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Average similarity a consistency check must exceed
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold: f64,

    /// Largest concurrent submission batch in a scaling ladder
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Batch size increment between scaling ladder steps
    #[serde(default = "default_step_size")]
    pub step_size: usize,

    /// Largest accepted ratio between average latencies of consecutive steps
    #[serde(default = "default_max_degradation")]
    pub max_degradation: f64,

    /// Slowest accepted submission latency in milliseconds
    #[serde(default = "default_response_time_threshold_ms")]
    pub response_time_threshold_ms: u64,

    /// Concurrent status reads in a status integrity check
    #[serde(default = "default_concurrent_status_reads")]
    pub concurrent_status_reads: usize,
}

const fn default_iterations() -> u32 {
    10
}

const fn default_consistency_threshold() -> f64 {
    0.8
}

const fn default_max_concurrent() -> usize {
    50
}

const fn default_step_size() -> usize {
    5
}

const fn default_max_degradation() -> f64 {
    1.5
}

const fn default_response_time_threshold_ms() -> u64 {
    2000
}

const fn default_concurrent_status_reads() -> usize {
    5
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            consistency_threshold: default_consistency_threshold(),
            max_concurrent: default_max_concurrent(),
            step_size: default_step_size(),
            max_degradation: default_max_degradation(),
            response_time_threshold_ms: default_response_time_threshold_ms(),
            concurrent_status_reads: default_concurrent_status_reads(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for rolling JSON log files (console only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}
