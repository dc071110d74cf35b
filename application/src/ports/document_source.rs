//! Document source port
//!
//! Supplies the candidate text blocks of each filing. HTML fetching and
//! parsing happen before this port; the pipeline never sees markup.

use filing_domain::FilingDocument;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid document {path}: {message}")]
    Invalid { path: String, message: String },

    #[error("Invalid document pattern: {0}")]
    Pattern(String),
}

/// Port for loading filing documents
pub trait DocumentSource: Send + Sync {
    /// Load every available document, in a stable order.
    fn load(&self) -> Result<Vec<FilingDocument>, SourceError>;
}
