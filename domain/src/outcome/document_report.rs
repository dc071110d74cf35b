//! Per-document results of the extraction pipeline

use super::decision_outcome::DecisionOutcome;
use super::resolution::HumanFlagReason;
use crate::concept::{Concept, ConceptFigure};
use crate::table::BalanceTable;
use crate::task::TaskKind;
use serde::Serialize;

/// A decision outcome together with the concept it was taken for, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(flatten)]
    pub outcome: DecisionOutcome,
}

/// Everything the pipeline learned about one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub document_id: String,
    pub outcomes: Vec<StageOutcome>,
    pub table_block: Option<usize>,
    pub sum_units: Option<u64>,
    /// Factor that converts table amounts to millions.
    pub sum_divider: Option<f64>,
    pub column_dates: Vec<String>,
    pub value_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<BalanceTable>,
    pub figures: Vec<ConceptFigure>,
    /// Stages that were skipped or degraded, in pipeline order.
    pub problems: Vec<String>,
}

impl DocumentReport {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            outcomes: Vec::new(),
            table_block: None,
            sum_units: None,
            sum_divider: None,
            column_dates: Vec::new(),
            value_column: None,
            table: None,
            figures: Vec::new(),
            problems: Vec::new(),
        }
    }

    pub fn push_outcome(&mut self, concept: Option<Concept>, outcome: DecisionOutcome) {
        self.outcomes.push(StageOutcome { concept, outcome });
    }

    pub fn problem(&mut self, message: impl Into<String>) {
        self.problems.push(message.into());
    }

    pub fn human_flags(&self) -> Vec<(TaskKind, Option<Concept>, HumanFlagReason)> {
        self.outcomes
            .iter()
            .filter_map(|s| s.outcome.flag.map(|flag| (s.outcome.kind, s.concept, flag)))
            .collect()
    }

    pub fn votes_used(&self) -> usize {
        self.outcomes.iter().map(|s| s.outcome.votes_used).sum()
    }

    pub fn figure(&self, concept: Concept) -> Option<&ConceptFigure> {
        self.figures.iter().find(|f| f.concept == concept)
    }

    /// No human flags and no degraded stages.
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty() && self.human_flags().is_empty()
    }
}
