//! Oracle capability tiers

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability tier of an oracle call.
///
/// `Fast` is the cheap default used for voting; `Strong` is only reached
/// through escalation or a supervisor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Fast,
    Strong,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fast => "fast",
            Tier::Strong => "strong",
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, Tier::Strong)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "mini" | "cheap" => Ok(Tier::Fast),
            "strong" | "large" => Ok(Tier::Strong),
            other => Err(DomainError::UnknownTier(other.to_string())),
        }
    }
}
