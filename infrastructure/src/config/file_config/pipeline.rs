//! Pipeline tuning from TOML (`[retry]`, `[extraction]`, `[suspicion.*]` and
//! `[pipeline]` sections)

use super::issue::{ConfigIssue, ConfigIssueCode};
use filing_application::{ExtractionThresholds, RetryPolicy, SuspicionFilters};
use filing_domain::SuspicionFilter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transient oracle failure handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub initial_backoff_secs: f64,
    pub max_backoff_secs: f64,
    /// Per-call timeout; `0` disables it.
    pub call_timeout_secs: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_secs: 1.0,
            max_backoff_secs: 8.0,
            call_timeout_secs: 120,
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut seconds = |field: &str, value: f64, fallback: Duration| {
            if value.is_finite() && value >= 0.0 {
                Duration::from_secs_f64(value)
            } else {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::OutOfRange {
                        field: format!("retry.{}", field),
                        value: value.to_string(),
                    },
                    format!("retry.{}: must be a non-negative number of seconds", field),
                ));
                fallback
            }
        };
        let defaults = RetryPolicy::default();
        let initial = seconds(
            "initial_backoff_secs",
            self.initial_backoff_secs,
            defaults.initial_backoff,
        );
        let max = seconds("max_backoff_secs", self.max_backoff_secs, defaults.max_backoff);
        let timeout = (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs));

        let policy = RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff(initial)
            .with_max_backoff(max.max(initial))
            .with_call_timeout(timeout);
        (policy, issues)
    }
}

/// Deterministic thresholds of the extraction stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractionConfig {
    pub min_table_block_len: usize,
    pub min_pre_table_len: usize,
    pub end_marker_min_offset_ratio: f64,
    pub min_table_keys: usize,
}

impl Default for FileExtractionConfig {
    fn default() -> Self {
        let defaults = ExtractionThresholds::default();
        Self {
            min_table_block_len: defaults.min_table_block_len,
            min_pre_table_len: defaults.min_pre_table_len,
            end_marker_min_offset_ratio: defaults.end_marker_min_offset_ratio,
            min_table_keys: defaults.min_table_keys,
        }
    }
}

impl FileExtractionConfig {
    pub fn to_thresholds(&self) -> (ExtractionThresholds, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut ratio = self.end_marker_min_offset_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "extraction.end_marker_min_offset_ratio".to_string(),
                    value: ratio.to_string(),
                },
                "extraction.end_marker_min_offset_ratio must be between 0 and 1; using the default",
            ));
            ratio = ExtractionThresholds::default().end_marker_min_offset_ratio;
        }
        let thresholds = ExtractionThresholds {
            min_table_block_len: self.min_table_block_len,
            min_pre_table_len: self.min_pre_table_len,
            end_marker_min_offset_ratio: ratio,
            min_table_keys: self.min_table_keys,
        };
        (thresholds, issues)
    }
}

/// Suspicion filters per concept.
///
/// # Example
///
/// ```toml
/// [suspicion.long_term_debt]
/// denylist = ["tax", "total", "lease"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSuspicionConfig {
    pub current_cash_position: SuspicionFilter,
    pub long_term_debt: SuspicionFilter,
}

impl Default for FileSuspicionConfig {
    fn default() -> Self {
        let defaults = SuspicionFilters::default();
        Self {
            current_cash_position: defaults.current_cash_position,
            long_term_debt: defaults.long_term_debt,
        }
    }
}

impl FileSuspicionConfig {
    pub fn to_filters(&self) -> SuspicionFilters {
        SuspicionFilters {
            current_cash_position: self.current_cash_position.clone(),
            long_term_debt: self.long_term_debt.clone(),
        }
    }
}

/// Batch-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    /// Documents processed at the same time.
    pub concurrency: usize,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}
