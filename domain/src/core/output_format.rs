//! Output format for batch results

use serde::{Deserialize, Serialize};

/// How the batch result is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-document summary lines and batch totals (default)
    #[default]
    Summary,
    /// Every document report as JSON
    Json,
}
