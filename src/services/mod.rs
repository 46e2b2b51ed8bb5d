//! Service layer
//!
//! Polling, similarity scoring and the harness scenarios built on the
//! [`TaskApi`](crate::domain::ports::TaskApi) port.

pub mod consistency;
pub mod fault_tolerance;
pub mod scaling;
pub mod similarity;
pub mod task_poller;

pub use consistency::{safely_cancel, ConsistencyReport, ConsistencyRunner};
pub use fault_tolerance::{
    FaultToleranceProbe, InputCase, InputOutcome, MalformedInputReport, StatusIntegrityReport,
};
pub use scaling::{LatencyReport, LatencySample, SampleOutcome, ScalingProbe, ScalingReport, StepMeasurement};
pub use similarity::{aggregate_similarity, edit_distance, similarity, string_similarity, SimilarityMatrix};
pub use task_poller::{PollSettings, TaskPoller};
