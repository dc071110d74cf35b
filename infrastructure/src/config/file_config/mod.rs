//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application's
//! [`PipelineConfig`] once validated.

mod issue;
mod oracle;
mod output;
mod pipeline;
mod voting;

pub use issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use oracle::FileOracleConfig;
pub use output::FileOutputConfig;
pub use pipeline::{
    FileExtractionConfig, FilePipelineConfig, FileRetryConfig, FileSuspicionConfig,
};
pub use voting::FileVotingConfig;

use filing_application::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Oracle endpoint and models per tier
    pub oracle: FileOracleConfig,
    /// Vote policies per task kind
    pub voting: FileVotingConfig,
    /// Transient failure handling
    pub retry: FileRetryConfig,
    /// Deterministic extraction thresholds
    pub extraction: FileExtractionConfig,
    /// Suspicion filters per concept
    pub suspicion: FileSuspicionConfig,
    /// Batch settings
    pub pipeline: FilePipelineConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.to_pipeline_config().1
    }

    /// Convert to the application configuration.
    ///
    /// Invalid values fall back to their defaults and are reported as
    /// issues; callers decide whether errors are fatal.
    pub fn to_pipeline_config(&self) -> (PipelineConfig, Vec<ConfigIssue>) {
        let mut issues = self.oracle.validate();

        let (voting, found) = self.voting.to_policies();
        issues.extend(found);
        let (retry, found) = self.retry.to_retry_policy();
        issues.extend(found);
        let (extraction, found) = self.extraction.to_thresholds();
        issues.extend(found);

        if self.pipeline.concurrency == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "pipeline.concurrency".to_string(),
                    value: "0".to_string(),
                },
                "pipeline.concurrency: must be at least 1; using 1",
            ));
        }

        let config = PipelineConfig::default()
            .with_voting(voting)
            .with_retry(retry)
            .with_extraction(extraction)
            .with_suspicion(self.suspicion.to_filters())
            .with_concurrency(self.pipeline.concurrency);
        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filing_domain::{OutputFormat, Tier, VotePolicy};
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[oracle]
base_url = "http://localhost:8080/v1"
fast_model = "small-model"
strong_model = "large-model"

[voting]
concept_items = "7/4"

[retry]
max_retries = 3
call_timeout_secs = 0

[extraction]
min_table_keys = 12

[suspicion.long_term_debt]
denylist = ["tax", "total", "lease"]

[pipeline]
concurrency = 8

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.oracle.model_for(Tier::Strong), "large-model");
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);

        let (pipeline, issues) = config.to_pipeline_config();
        assert!(issues.is_empty());
        assert_eq!(pipeline.voting.concept_items, VotePolicy::new(7, 4).unwrap());
        assert_eq!(pipeline.retry.max_retries, 3);
        assert_eq!(pipeline.retry.call_timeout, None);
        assert_eq!(pipeline.extraction.min_table_keys, 12);
        assert_eq!(pipeline.suspicion.long_term_debt.denylist.len(), 3);
        assert_eq!(pipeline.concurrency, 8);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[retry]
max_retries = 0
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (pipeline, issues) = config.to_pipeline_config();
        assert!(issues.is_empty());
        assert_eq!(pipeline.retry.max_retries, 0);
        assert_eq!(pipeline.retry.initial_backoff, Duration::from_secs(1));
        assert_eq!(pipeline.retry.call_timeout, Some(Duration::from_secs(120)));
        assert_eq!(pipeline.voting, Default::default());
    }

    #[test]
    fn test_default_config_matches_pipeline_defaults() {
        let (pipeline, issues) = FileConfig::default().to_pipeline_config();
        assert!(issues.is_empty());
        assert_eq!(pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let mut config = FileConfig::default();
        config.voting.locate_table = Some("0/0".to_string());
        config.oracle.fast_model = " ".to_string();
        config.pipeline.concurrency = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(ConfigIssue::has_errors(&issues));
        assert!(
            issues
                .iter()
                .any(|i| matches!(&i.code, ConfigIssueCode::EmptyModelName { field } if field == "fast_model"))
        );
    }
}
