//! Retry policy for transient oracle failures.
//!
//! [`RetryPolicy`] bounds how often a failed oracle call is repeated and
//! how long each call may take. Transport retries never count as votes.

use std::time::Duration;

/// Timeout and backoff parameters for oracle calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 2 means up to 3 attempts.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Maximum time a single call may take.
    pub call_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl RetryPolicy {
    /// Retry immediately; useful for tests and local stubs.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            call_timeout: None,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.call_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(8));
        assert_eq!(policy.backoff_for(40), Duration::from_secs(8));
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicy::default()
            .with_max_retries(5)
            .with_initial_backoff(Duration::from_millis(10))
            .with_call_timeout(None);
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.backoff_for(2), Duration::from_millis(40));
        assert!(policy.call_timeout.is_none());
    }
}
