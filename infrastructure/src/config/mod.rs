//! Configuration file loading for filing-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FILING_QUORUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./filing-quorum.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/filing-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, FileConfig, FileExtractionConfig, FileOracleConfig,
    FileOutputConfig, FilePipelineConfig, FileRetryConfig, FileSuspicionConfig, FileVotingConfig,
    Severity,
};
pub use loader::ConfigLoader;
