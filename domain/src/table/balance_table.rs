//! Structured balance sheet produced by the table conversion stage.

use serde::Serialize;
use serde_json::{Map, Value};

/// Nested key/value mapping of a balance sheet.
///
/// Keys are row labels; values are numbers, `null`, arrays of those (one
/// entry per date column) or nested mappings. Anything else is rejected by
/// [`BalanceTable::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BalanceTable(Map<String, Value>);

/// One leaf of the table: the label path from the root and its column values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    pub path: Vec<String>,
    pub values: Vec<Option<i64>>,
}

/// Rows below the first top-level key matching a search term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSection {
    pub key: String,
    pub rows: Vec<TableRow>,
}

impl BalanceTable {
    /// Check the table grammar and wrap the mapping.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => {
                check_mapping(&map, "")?;
                Ok(Self(map))
            }
            other => Err(format!("expected a mapping at the top level, got {}", type_name(&other))),
        }
    }

    /// Number of keys across all nesting levels.
    pub fn key_count(&self) -> usize {
        count_keys(&self.0)
    }

    /// First top-level mapping whose label contains `term` (case-insensitive).
    ///
    /// Row paths inside the section start below the section key.
    pub fn section(&self, term: &str) -> Option<TableSection> {
        let term = term.to_lowercase();
        self.0.iter().find_map(|(key, value)| match value {
            Value::Object(inner) if key.to_lowercase().contains(&term) => {
                let mut rows = Vec::new();
                collect_rows(inner, &mut Vec::new(), &mut rows);
                Some(TableSection {
                    key: key.clone(),
                    rows,
                })
            }
            _ => None,
        })
    }

    /// Median number of value columns over all array leaves.
    ///
    /// Halves round to the nearest even count. `None` when no leaf holds an
    /// array.
    pub fn median_column_count(&self) -> Option<usize> {
        let mut lengths = Vec::new();
        collect_array_lengths(&self.0, &mut lengths);
        if lengths.is_empty() {
            return None;
        }
        lengths.sort_unstable();
        let mid = lengths.len() / 2;
        if lengths.len() % 2 == 1 {
            return Some(lengths[mid]);
        }
        let sum = lengths[mid - 1] + lengths[mid];
        let floor = sum / 2;
        if sum % 2 == 1 && floor % 2 == 1 {
            Some(floor + 1)
        } else {
            Some(floor)
        }
    }
}

impl TableRow {
    pub fn label(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn value_at(&self, column: usize) -> Option<i64> {
        self.values.get(column).copied().flatten()
    }
}

fn check_mapping(map: &Map<String, Value>, prefix: &str) -> Result<(), String> {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{} > {}", prefix, key)
        };
        match value {
            Value::Number(_) | Value::Null => {}
            Value::Array(items) => {
                if let Some(bad) = items
                    .iter()
                    .find(|item| !matches!(item, Value::Number(_) | Value::Null))
                {
                    return Err(format!("'{}' holds a non-numeric {}", path, type_name(bad)));
                }
            }
            Value::Object(inner) => check_mapping(inner, &path)?,
            other => return Err(format!("'{}' holds a {}", path, type_name(other))),
        }
    }
    Ok(())
}

fn count_keys(map: &Map<String, Value>) -> usize {
    map.values()
        .map(|value| match value {
            Value::Object(inner) => 1 + count_keys(inner),
            _ => 1,
        })
        .sum()
}

fn collect_rows(map: &Map<String, Value>, path: &mut Vec<String>, rows: &mut Vec<TableRow>) {
    for (key, value) in map {
        path.push(key.clone());
        match value {
            Value::Object(inner) => collect_rows(inner, path, rows),
            Value::Array(items) => rows.push(TableRow {
                index: rows.len(),
                path: path.clone(),
                values: items.iter().map(as_integer).collect(),
            }),
            scalar => rows.push(TableRow {
                index: rows.len(),
                path: path.clone(),
                values: vec![as_integer(scalar)],
            }),
        }
        path.pop();
    }
}

fn collect_array_lengths(map: &Map<String, Value>, lengths: &mut Vec<usize>) {
    for value in map.values() {
        match value {
            Value::Object(inner) => collect_array_lengths(inner, lengths),
            Value::Array(items) => lengths.push(items.len()),
            _ => {}
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
