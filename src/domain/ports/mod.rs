//! Port trait definitions (Hexagonal Architecture)
//!
//! - TaskApi: task operations of the remote service
//!
//! The HTTP client in `infrastructure::api` implements these; tests use
//! scripted implementations.

pub mod task_api;

pub use task_api::TaskApi;
