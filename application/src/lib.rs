//! Application layer for filing-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod usage;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{ExtractionThresholds, PipelineConfig, RetryPolicy, SuspicionFilters, VotingPolicies};
pub use ports::{
    document_source::{DocumentSource, SourceError},
    oracle::{OracleClient, OracleError},
    outcome_sink::{NoOutcomeSink, OutcomeSink},
    progress::{NoProgress, PipelineProgress},
};
pub use usage::{UsageMeter, UsageSnapshot};
pub use use_cases::call_oracle::{OracleFailure, ResilientOracle};
pub use use_cases::process_document::ProcessDocumentUseCase;
pub use use_cases::resolve_decision::EscalationController;
pub use use_cases::run_batch::{BatchOutput, BatchSummary, RunBatchUseCase};
