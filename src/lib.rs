//! taskprobe - conformance harness for remote task-execution APIs
//!
//! taskprobe submits tasks to a remote task service, polls them until they
//! settle, and scores how alike repeated results are.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Task model, configuration model, errors and
//!   the [`TaskApi`](domain::ports::TaskApi) port
//! - **Infrastructure Layer** (`infrastructure`): HTTP client with retries,
//!   configuration loading, logging
//! - **Service Layer** (`services`): Task poller, similarity engine and the
//!   harness scenarios
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskprobe::{Config, PollSettings, RemoteTaskClient, TaskPoller};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let client = Arc::new(RemoteTaskClient::new(&config)?);
//!     let submission = client.submit_task("Write a haiku about Rust").await?;
//!
//!     let poller = TaskPoller::new(client, PollSettings::from_config(&config.polling));
//!     let result = poller.poll_until_terminal(submission.task_id()).await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ApiError, PollError, ProbeError};
pub use domain::models::{
    Availability, Cancellation, Config, Submission, TaskHandle, TaskSnapshot, TaskStatus,
    RATE_LIMITED_TASK_ID,
};
pub use domain::ports::TaskApi;
pub use infrastructure::api::{RemoteTaskClient, RetryPolicy};
pub use infrastructure::config::ConfigLoader;
pub use services::{
    aggregate_similarity, edit_distance, similarity, PollSettings, SimilarityMatrix, TaskPoller,
};
