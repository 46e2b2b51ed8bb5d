//! Infrastructure layer module
//!
//! External integrations and adapters:
//! - Remote task API client (reqwest) with fixed-delay retry
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//!
//! The API client satisfies the `TaskApi` port defined in the domain layer.

pub mod api;
pub mod config;
pub mod logging;
