//! Task kinds handled by the decision protocol

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of oracle-backed decision.
///
/// The kind selects the validator, the prompt template and the default
/// vote policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    LocateTableBlock,
    IdentifySumUnits,
    IdentifyTableEndMarker,
    ConvertTableToStructured,
    IdentifyColumnDates,
    ExtractConceptItems,
}

/// Shape the oracle is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Freeform,
    Structured,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::LocateTableBlock,
        TaskKind::IdentifySumUnits,
        TaskKind::IdentifyTableEndMarker,
        TaskKind::ConvertTableToStructured,
        TaskKind::IdentifyColumnDates,
        TaskKind::ExtractConceptItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::LocateTableBlock => "locate-table-block",
            TaskKind::IdentifySumUnits => "identify-sum-units",
            TaskKind::IdentifyTableEndMarker => "identify-table-end-marker",
            TaskKind::ConvertTableToStructured => "convert-table-to-structured-form",
            TaskKind::IdentifyColumnDates => "identify-column-dates",
            TaskKind::ExtractConceptItems => "extract-concept-items",
        }
    }

    pub fn response_format(&self) -> ResponseFormat {
        match self {
            TaskKind::ConvertTableToStructured | TaskKind::ExtractConceptItems => {
                ResponseFormat::Structured
            }
            _ => ResponseFormat::Freeform,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| DomainError::UnknownTaskKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.as_str().parse::<TaskKind>().unwrap(), kind);
        }
        assert_eq!(
            "extract_concept_items".parse::<TaskKind>().unwrap(),
            TaskKind::ExtractConceptItems
        );
        assert!("summarise".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_structured_kinds() {
        assert_eq!(
            TaskKind::ConvertTableToStructured.response_format(),
            ResponseFormat::Structured
        );
        assert_eq!(
            TaskKind::LocateTableBlock.response_format(),
            ResponseFormat::Freeform
        );
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&TaskKind::IdentifySumUnits).unwrap();
        assert_eq!(json, "\"identify-sum-units\"");
    }
}
