pub mod client;
pub mod retry;
pub mod types;

pub use client::RemoteTaskClient;
pub use retry::{RetryBudget, RetryPolicy};
