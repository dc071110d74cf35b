//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod call_oracle;
pub mod collect_votes;
pub mod process_document;
pub mod resolve_decision;
pub mod run_batch;
