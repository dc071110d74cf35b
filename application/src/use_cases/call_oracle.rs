//! Resilient oracle calls: timeout, retry with backoff and usage counting.

use crate::config::RetryPolicy;
use crate::ports::oracle::{OracleClient, OracleError};
use crate::usage::UsageMeter;
use filing_domain::{HumanFlagReason, Prompt, ResponseFormat, Tier};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Terminal failure of an oracle call after the retry budget was spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleFailure {
    #[error("oracle unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("oracle refused the request: {0}")]
    Refused(String),
}

impl OracleFailure {
    /// Reason code recorded on the human-flagged outcome.
    pub fn flag_reason(&self) -> HumanFlagReason {
        match self {
            OracleFailure::Unavailable { .. } => HumanFlagReason::OracleUnavailable,
            OracleFailure::Refused(_) => HumanFlagReason::OracleRefused,
        }
    }
}

/// Wraps an [`OracleClient`] with the [`RetryPolicy`] and the shared
/// [`UsageMeter`].
///
/// Transient errors (`Unavailable`, `Timeout`) are retried transparently;
/// a refusal ends the call at once.
pub struct ResilientOracle<O: OracleClient + 'static> {
    client: Arc<O>,
    retry: RetryPolicy,
    usage: Arc<UsageMeter>,
}

impl<O: OracleClient + 'static> ResilientOracle<O> {
    pub fn new(client: Arc<O>, retry: RetryPolicy, usage: Arc<UsageMeter>) -> Self {
        Self {
            client,
            retry,
            usage,
        }
    }

    pub fn usage(&self) -> &Arc<UsageMeter> {
        &self.usage
    }

    pub async fn complete(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleFailure> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1u32;
        loop {
            self.usage.record_call(tier);
            match self.attempt(prompt, tier, format).await {
                Ok(text) => return Ok(text),
                Err(OracleError::Refused(reason)) => {
                    self.usage.record_failure();
                    warn!(tier = %tier, "Oracle refused the request: {}", reason);
                    return Err(OracleFailure::Refused(reason));
                }
                Err(error) => {
                    self.usage.record_failure();
                    if attempt >= max_attempts {
                        warn!(
                            tier = %tier,
                            attempts = attempt,
                            "Oracle unavailable, giving up: {}",
                            error
                        );
                        return Err(OracleFailure::Unavailable {
                            attempts: attempt,
                            last_error: error.to_string(),
                        });
                    }
                    let delay = self.retry.backoff_for(attempt - 1);
                    warn!(
                        tier = %tier,
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        "Oracle call failed, retrying: {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleError> {
        let call = self.client.complete(prompt, tier, format);
        match self.retry.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                debug!(tier = %tier, "Oracle call exceeded {:?}", limit);
                Err(OracleError::Timeout)
            }),
            None => call.await,
        }
    }
}
