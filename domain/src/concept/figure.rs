//! Balance sheet concepts and their summed figures.

use super::suspicion::SuspicionFilter;
use crate::core::error::DomainError;
use crate::table::TableSection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A balance sheet figure assembled from one or more table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concept {
    CurrentCashPosition,
    LongTermDebt,
}

impl Concept {
    pub const ALL: [Concept; 2] = [Concept::CurrentCashPosition, Concept::LongTermDebt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Concept::CurrentCashPosition => "current-cash-position",
            Concept::LongTermDebt => "long-term-debt",
        }
    }

    /// Human wording used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Concept::CurrentCashPosition => "current cash position",
            Concept::LongTermDebt => "long-term debt",
        }
    }

    /// Fragment of the top-level table key holding the concept's rows.
    pub fn section_term(&self) -> &'static str {
        match self {
            Concept::CurrentCashPosition => "asset",
            Concept::LongTermDebt => "liabilit",
        }
    }

    pub fn default_filter(&self) -> SuspicionFilter {
        match self {
            Concept::CurrentCashPosition => SuspicionFilter::current_cash_position(),
            Concept::LongTermDebt => SuspicionFilter::long_term_debt(),
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Concept {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Concept::ALL
            .into_iter()
            .find(|concept| concept.as_str() == wanted)
            .ok_or_else(|| DomainError::UnknownConcept(s.to_string()))
    }
}

/// A selected row and its value in the value-date column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureLine {
    pub index: usize,
    pub path: Vec<String>,
    pub value: Option<i64>,
}

/// Rows selected for a concept with their per-row sums and total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptFigure {
    pub concept: Concept,
    pub section: String,
    pub column: Option<usize>,
    pub lines: Vec<FigureLine>,
    pub total: i64,
    /// Selected rows without a value in the chosen column.
    pub missing: Vec<usize>,
}

impl ConceptFigure {
    pub fn compute(
        concept: Concept,
        section: &TableSection,
        items: &BTreeSet<usize>,
        column: Option<usize>,
    ) -> Self {
        let lines: Vec<FigureLine> = items
            .iter()
            .filter_map(|&index| section.rows.get(index))
            .map(|row| FigureLine {
                index: row.index,
                path: row.path.clone(),
                value: column.and_then(|c| row.value_at(c)),
            })
            .collect();
        let total = lines.iter().filter_map(|line| line.value).sum();
        let missing = lines
            .iter()
            .filter(|line| line.value.is_none())
            .map(|line| line.index)
            .collect();

        Self {
            concept,
            section: section.key.clone(),
            column,
            lines,
            total,
            missing,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.column.is_some()
    }
}
