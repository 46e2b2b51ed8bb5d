//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskprobe")]
#[command(about = "Conformance harness for remote task-execution APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .taskprobe/
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a task description
    Submit {
        /// Task description, sent unmodified
        description: String,
    },

    /// Show the current status of a task
    Status {
        task_id: String,
    },

    /// Cancel a task
    Cancel {
        task_id: String,
    },

    /// Poll a task until it completes, fails or times out
    Wait {
        task_id: String,

        /// Delay between status reads (overrides polling.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Upper bound on total polling time (overrides polling.timeout_ms)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Submit a task, wait for its result, then cancel it
    Run {
        description: String,

        /// Leave the task in place instead of cancelling it afterwards
        #[arg(long)]
        keep: bool,
    },

    /// Read the metrics endpoint
    Metrics,

    /// Read the logs endpoint
    Logs,

    /// Read the admin status endpoint
    AdminStatus,

    /// Submit one description repeatedly and compare the results
    Consistency {
        /// Task description (defaults to the built-in consistency task)
        #[arg(short, long)]
        description: Option<String>,

        /// Number of runs (overrides probe.iterations)
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Minimum average similarity (overrides probe.consistency_threshold)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Measure submission time at increasing concurrency
    Scale {
        /// Concurrency increment (overrides probe.step_size)
        #[arg(long)]
        step: Option<usize>,

        /// Highest concurrency (overrides probe.max_concurrent)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Measure submission latency of every sample task
    Latency,

    /// Submit malformed descriptions and check none causes a server error
    MalformedInput,

    /// Check concurrent status reads leave a task's status unchanged
    StatusIntegrity {
        /// Task description (defaults to the built-in integrity task)
        #[arg(short, long)]
        description: Option<String>,

        /// Concurrent reads (overrides probe.concurrent_status_reads)
        #[arg(short, long)]
        reads: Option<usize>,
    },

    /// Score how similar two values are
    Similarity {
        /// Left value, parsed as JSON when valid
        left: String,

        /// Right value, parsed as JSON when valid
        right: String,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets redacted
    Show,
}
