//! Infrastructure layer for filing-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod oracle;
pub mod source;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigLoader, FileConfig, FileOracleConfig, Severity};
pub use logging::JsonlOutcomeSink;
pub use oracle::{OpenAiOracle, OracleSetupError};
pub use source::JsonDirectorySource;
