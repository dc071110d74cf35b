//! Process-wide oracle usage counters.

use filing_domain::Tier;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Oracle calls consumed, grouped by tier.
///
/// Shared by every document of a batch; counters are only ever incremented.
#[derive(Debug, Default)]
pub struct UsageMeter {
    fast_calls: AtomicU64,
    strong_calls: AtomicU64,
    failed_calls: AtomicU64,
}

/// Point-in-time copy of a [`UsageMeter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub fast_calls: u64,
    pub strong_calls: u64,
    /// Attempts that ended in a transport error, timeout or refusal.
    pub failed_calls: u64,
}

impl UsageSnapshot {
    pub fn total_calls(&self) -> u64 {
        self.fast_calls + self.strong_calls
    }
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt, successful or not.
    pub fn record_call(&self, tier: Tier) {
        let counter = match tier {
            Tier::Fast => &self.fast_calls,
            Tier::Strong => &self.strong_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            fast_calls: self.fast_calls.load(Ordering::Relaxed),
            strong_calls: self.strong_calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
        }
    }
}
