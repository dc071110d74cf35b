//! Filing documents as supplied by a document source.

use serde::{Deserialize, Serialize};

/// Candidate text blocks of one filing, already extracted from HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingDocument {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<String>,
    /// Text preceding the balance sheet, when the source already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_table_text: Option<String>,
}

impl FilingDocument {
    pub fn new(id: impl Into<String>, blocks: Vec<String>) -> Self {
        Self {
            id: id.into(),
            blocks,
            pre_table_text: None,
        }
    }

    pub fn with_pre_table_text(mut self, text: impl Into<String>) -> Self {
        self.pre_table_text = Some(text.into());
        self
    }
}
