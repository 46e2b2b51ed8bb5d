pub mod config;
pub mod sample_tasks;
pub mod task;

pub use config::{
    AdminConfig, ApiConfig, Config, LogFormat, LoggingConfig, ObservabilityConfig, PollingConfig,
    ProbeConfig, RetryConfig, RotationPolicy,
};
pub use sample_tasks::{
    malformed_inputs, Complexity, SampleTask, CONSISTENCY_TASK, INTEGRITY_TASK, SAMPLE_TASKS,
};
pub use task::{
    Availability, Cancellation, Submission, TaskHandle, TaskSnapshot, TaskStatus,
    RATE_LIMITED_TASK_ID,
};
