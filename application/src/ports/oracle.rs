//! Oracle client port
//!
//! Defines the interface for the language-completion capability that answers
//! decision prompts.

use async_trait::async_trait;
use filing_domain::{Prompt, ResponseFormat, Tier};
use thiserror::Error;

/// Errors a single oracle call can fail with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Network failure, rate limiting or a server-side error.
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle call timed out")]
    Timeout,

    /// Content-policy rejection or any other non-retryable refusal.
    #[error("Oracle refused the request: {0}")]
    Refused(String),
}

impl OracleError {
    /// Transient errors are retried with backoff; refusals are not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OracleError::Refused(_))
    }
}

/// Language-completion capability
///
/// Given a prompt and a tier, returns raw completion text. Implementations
/// (adapters) live in the infrastructure layer; tests substitute scripted
/// stubs.
#[async_trait]
pub trait OracleClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleError>;
}
