//! Harness configuration loading
//!
//! Defaults, then `.taskprobe/*.yaml`, then `TASKPROBE_*` environment
//! variables, merged with figment and validated before use.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
