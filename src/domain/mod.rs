//! Domain layer for taskprobe
//!
//! This module contains the remote task model, harness configuration model,
//! error types and the port the poller depends on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ApiError, PollError, ProbeError};
