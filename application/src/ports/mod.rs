//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod document_source;
pub mod oracle;
pub mod outcome_sink;
pub mod progress;
