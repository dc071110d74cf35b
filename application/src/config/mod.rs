//! Application-level configuration.
//!
//! - [`PipelineConfig`] - vote policies, thresholds, suspicion filters and concurrency
//! - [`RetryPolicy`] - timeout and backoff for transient oracle failures

pub mod pipeline_config;
pub mod retry_policy;

pub use pipeline_config::{ExtractionThresholds, PipelineConfig, SuspicionFilters, VotingPolicies};
pub use retry_policy::RetryPolicy;
