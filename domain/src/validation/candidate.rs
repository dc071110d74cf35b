//! Normalized candidate values

use crate::core::text::truncate;
use crate::table::BalanceTable;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Normalized value of a response that passed validation.
///
/// Equality of normalized values is what voting counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum CandidateValue {
    Index(usize),
    Units(u64),
    Marker(String),
    Table(BalanceTable),
    Dates(Vec<String>),
    Items(BTreeSet<usize>),
}

impl CandidateValue {
    /// Stable key used to group equal values while voting.
    pub fn vote_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            CandidateValue::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn as_units(&self) -> Option<u64> {
        match self {
            CandidateValue::Units(units) => Some(*units),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<&str> {
        match self {
            CandidateValue::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&BalanceTable> {
        match self {
            CandidateValue::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_dates(&self) -> Option<&[String]> {
        match self {
            CandidateValue::Dates(dates) => Some(dates),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&BTreeSet<usize>> {
        match self {
            CandidateValue::Items(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for CandidateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateValue::Index(index) => write!(f, "block {}", index),
            CandidateValue::Units(units) => write!(f, "units {}", units),
            CandidateValue::Marker(marker) => write!(f, "marker {:?}", truncate(marker, 40)),
            CandidateValue::Table(table) => write!(f, "table with {} keys", table.key_count()),
            CandidateValue::Dates(dates) => write!(f, "dates [{}]", dates.join(", ")),
            CandidateValue::Items(items) => {
                let list: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "items [{}]", list.join(", "))
            }
        }
    }
}

/// A response that passed the validator, with its raw text kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedCandidate {
    pub value: CandidateValue,
    pub raw: String,
}

impl ValidatedCandidate {
    pub fn new(value: CandidateValue, raw: impl Into<String>) -> Self {
        Self {
            value,
            raw: raw.into(),
        }
    }

    pub fn vote_key(&self) -> String {
        self.value.vote_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_key_ignores_raw_text() {
        let a = ValidatedCandidate::new(CandidateValue::Index(1), "1");
        let b = ValidatedCandidate::new(CandidateValue::Index(1), " 1\n");
        assert_eq!(a.vote_key(), b.vote_key());
        assert_ne!(a.vote_key(), CandidateValue::Units(1).vote_key());
    }

    #[test]
    fn test_item_sets_compare_unordered() {
        let a = CandidateValue::Items(BTreeSet::from([3, 2]));
        let b = CandidateValue::Items(BTreeSet::from([2, 3]));
        assert_eq!(a.vote_key(), b.vote_key());
        assert_eq!(a.to_string(), "items [2, 3]");
    }
}
