//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid vote policy: {0}")]
    InvalidVotePolicy(String),

    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),

    #[error("Unknown concept: {0}")]
    UnknownConcept(String),

    #[error("Unknown tier: {0}")]
    UnknownTier(String),
}
