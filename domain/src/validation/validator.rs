//! Response validator
//!
//! [`validate`] is a pure function of the task kind, the raw oracle text and
//! the task's constraints. It never calls the oracle.

use super::candidate::{CandidateValue, ValidatedCandidate};
use super::repair::{close_braces, repair_end_marker};
use crate::table::{BalanceTable, find_marker};
use crate::task::{Constraints, TaskKind};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Why a response was not accepted as a candidate.
///
/// Rejections drive the next voting round and are kept in the audit trail;
/// they are never surfaced as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("empty response")]
    Empty,

    #[error("response declares no answer")]
    DeclaredUnknown,

    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("index {index} is outside 0..{count}")]
    OutOfRange { index: i64, count: usize },

    #[error("block {index} has {len} characters, at least {min} required")]
    BlockTooShort { index: usize, len: usize, min: usize },

    #[error("{0} is not an allowed unit")]
    UnitsNotAllowed(i64),

    #[error("marker not found in the source text")]
    MarkerNotFound,

    #[error("malformed structure: {0}")]
    Malformed(String),

    #[error("table has {found} keys, at least {required} required")]
    TooFewKeys { found: usize, required: usize },

    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("item {index} is outside the {rows} table rows")]
    ItemOutOfDomain { index: usize, rows: usize },

    #[error("{constraints} constraints cannot validate a {kind} response")]
    ConstraintMismatch {
        kind: TaskKind,
        constraints: TaskKind,
    },
}

/// Validate a raw oracle response for `kind` under `constraints`.
///
/// # Example
///
/// ```
/// use filing_domain::task::Constraints;
/// use filing_domain::task::TaskKind;
/// use filing_domain::validation::{validate, CandidateValue};
///
/// let constraints = Constraints::TableLocation { block_lengths: vec![10, 10, 10], min_block_len: 0 };
/// let accepted = validate(TaskKind::LocateTableBlock, " 2\n", &constraints).unwrap();
/// assert_eq!(accepted.value, CandidateValue::Index(2));
/// assert!(validate(TaskKind::LocateTableBlock, "3", &constraints).is_err());
/// ```
pub fn validate(
    kind: TaskKind,
    raw: &str,
    constraints: &Constraints,
) -> Result<ValidatedCandidate, Rejection> {
    if constraints.kind() != kind {
        return Err(Rejection::ConstraintMismatch {
            kind,
            constraints: constraints.kind(),
        });
    }

    let text = clean(raw);
    if text.is_empty() {
        return Err(Rejection::Empty);
    }
    if declares_unknown(&text) {
        return Err(Rejection::DeclaredUnknown);
    }

    let value = match constraints {
        Constraints::TableLocation {
            block_lengths,
            min_block_len,
        } => validate_block_index(&text, block_lengths, *min_block_len)?,
        Constraints::SumUnits { allowed } => validate_units(&text, allowed)?,
        Constraints::EndMarker {
            source,
            search_from,
        } => validate_marker(&text, source, *search_from)?,
        Constraints::StructuredTable { min_keys } => validate_table(&text, *min_keys)?,
        Constraints::ColumnDates => validate_dates(&text)?,
        Constraints::ConceptItems { row_paths } => validate_items(&text, row_paths.len())?,
    };
    Ok(ValidatedCandidate::new(value, raw))
}

/// Trim whitespace and strip markdown code fences and stray backticks.
fn clean(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag line, if any.
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
        text = text.trim_end().strip_suffix("```").unwrap_or(text);
    }
    text.trim().trim_matches('`').trim().to_string()
}

fn declares_unknown(text: &str) -> bool {
    let lowered = strip_quotes(text).trim().to_ascii_lowercase();
    matches!(lowered.as_str(), "none" | "null" | "n/a")
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2
            && let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

fn parse_integer(text: &str) -> Result<i64, Rejection> {
    let digits = strip_quotes(text).trim().replace([',', '_'], "");
    digits
        .parse::<i64>()
        .map_err(|_| Rejection::NotAnInteger(text.to_string()))
}

fn validate_block_index(
    text: &str,
    block_lengths: &[usize],
    min_block_len: usize,
) -> Result<CandidateValue, Rejection> {
    let index = parse_integer(text)?;
    let count = block_lengths.len();
    let position = usize::try_from(index)
        .ok()
        .filter(|&i| i < count)
        .ok_or(Rejection::OutOfRange { index, count })?;
    let len = block_lengths[position];
    if len < min_block_len {
        return Err(Rejection::BlockTooShort {
            index: position,
            len,
            min: min_block_len,
        });
    }
    Ok(CandidateValue::Index(position))
}

fn validate_units(text: &str, allowed: &[u64]) -> Result<CandidateValue, Rejection> {
    let units = parse_integer(text)?;
    u64::try_from(units)
        .ok()
        .filter(|u| allowed.contains(u))
        .map(CandidateValue::Units)
        .ok_or(Rejection::UnitsNotAllowed(units))
}

fn validate_marker(
    text: &str,
    source: &str,
    search_from: usize,
) -> Result<CandidateValue, Rejection> {
    let marker = strip_quotes(text).trim();
    if marker.is_empty() {
        return Err(Rejection::Empty);
    }
    if find_marker(source, marker, search_from).is_some() {
        return Ok(CandidateValue::Marker(marker.to_string()));
    }
    repair_end_marker(marker)
        .filter(|repaired| find_marker(source, repaired, search_from).is_some())
        .map(CandidateValue::Marker)
        .ok_or(Rejection::MarkerNotFound)
}

fn validate_table(text: &str, min_keys: usize) -> Result<CandidateValue, Rejection> {
    let repaired = close_braces(text);
    let value: Value =
        serde_json::from_str(&repaired).map_err(|e| Rejection::Malformed(e.to_string()))?;
    let table = BalanceTable::from_value(value).map_err(Rejection::Malformed)?;
    let found = table.key_count();
    if found < min_keys {
        return Err(Rejection::TooFewKeys {
            found,
            required: min_keys,
        });
    }
    Ok(CandidateValue::Table(table))
}

fn validate_dates(text: &str) -> Result<CandidateValue, Rejection> {
    let normalized = if text.starts_with('[') && text.contains('\'') && !text.contains('"') {
        text.replace('\'', "\"")
    } else {
        text.to_string()
    };
    let dates: Vec<String> = serde_json::from_str(&normalized)
        .map_err(|_| Rejection::Malformed("expected a list of date strings".to_string()))?;
    if let Some(bad) = dates.iter().find(|d| !DATE_PATTERN.is_match(d.trim())) {
        return Err(Rejection::InvalidDate(bad.clone()));
    }
    Ok(CandidateValue::Dates(
        dates.into_iter().map(|d| d.trim().to_string()).collect(),
    ))
}

fn validate_items(text: &str, rows: usize) -> Result<CandidateValue, Rejection> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Rejection::Malformed(e.to_string()))?;
    let list = match value {
        Value::Array(list) => list,
        Value::Object(map) if map.is_empty() => Vec::new(),
        Value::Object(map) => ["itemIndices", "item_indices", "items"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(|found| found.as_array().cloned())
            .ok_or_else(|| Rejection::Malformed("missing itemIndices list".to_string()))?,
        _ => return Err(Rejection::Malformed("expected a list of item indices".to_string())),
    };

    let mut items = BTreeSet::new();
    for entry in list {
        let index = match &entry {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        }
        .ok_or_else(|| Rejection::Malformed(format!("{} is not an item index", entry)))?;
        if index >= rows {
            return Err(Rejection::ItemOutOfDomain { index, rows });
        }
        items.insert(index);
    }
    Ok(CandidateValue::Items(items))
}
