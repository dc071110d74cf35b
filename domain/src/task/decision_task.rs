//! Decision tasks

use super::constraints::Constraints;
use super::kind::{ResponseFormat, TaskKind};
use super::policy::VotePolicy;
use crate::concept::{Concept, SuspicionFilter};
use crate::prompt::{Prompt, PromptTemplate};
use crate::table::TableSection;

/// Supervisor review declared by concept-extraction tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct Supervision {
    pub concept: Concept,
    pub filter: SuspicionFilter,
    pub policy: VotePolicy,
}

/// One unit of work requiring an oracle-backed decision.
///
/// Immutable once built. The constructors keep kind, prompt and
/// constraints consistent with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTask {
    kind: TaskKind,
    prompt: Prompt,
    constraints: Constraints,
    policy: VotePolicy,
    supervision: Option<Supervision>,
}

impl DecisionTask {
    pub fn locate_table<S: AsRef<str>>(
        blocks: &[S],
        min_block_len: usize,
        policy: VotePolicy,
    ) -> Self {
        Self {
            kind: TaskKind::LocateTableBlock,
            prompt: PromptTemplate::locate_table(blocks),
            constraints: Constraints::table_location(blocks, min_block_len),
            policy,
            supervision: None,
        }
    }

    pub fn sum_units(pre_table_text: &str, policy: VotePolicy) -> Self {
        Self {
            kind: TaskKind::IdentifySumUnits,
            prompt: PromptTemplate::sum_units(pre_table_text),
            constraints: Constraints::sum_units(),
            policy,
            supervision: None,
        }
    }

    /// `search_from` is the byte offset in `table_text` where the marker may start.
    pub fn end_marker(table_text: &str, search_from: usize, policy: VotePolicy) -> Self {
        Self {
            kind: TaskKind::IdentifyTableEndMarker,
            prompt: PromptTemplate::end_marker(table_text),
            constraints: Constraints::EndMarker {
                source: table_text.to_string(),
                search_from,
            },
            policy,
            supervision: None,
        }
    }

    pub fn structured_table(table_body: &str, min_keys: usize, policy: VotePolicy) -> Self {
        Self {
            kind: TaskKind::ConvertTableToStructured,
            prompt: PromptTemplate::structured_table(table_body),
            constraints: Constraints::StructuredTable { min_keys },
            policy,
            supervision: None,
        }
    }

    pub fn column_dates(pre_table_text: &str, policy: VotePolicy) -> Self {
        Self {
            kind: TaskKind::IdentifyColumnDates,
            prompt: PromptTemplate::column_dates(pre_table_text),
            constraints: Constraints::ColumnDates,
            policy,
            supervision: None,
        }
    }

    pub fn concept_items(concept: Concept, section: &TableSection, policy: VotePolicy) -> Self {
        let row_paths: Vec<Vec<String>> = section.rows.iter().map(|row| row.path.clone()).collect();
        Self {
            kind: TaskKind::ExtractConceptItems,
            prompt: PromptTemplate::concept_items(concept, &section.key, &row_paths),
            constraints: Constraints::ConceptItems { row_paths },
            policy,
            supervision: None,
        }
    }

    /// Attach a supervisor check; only meaningful for concept selections.
    pub fn with_supervision(mut self, supervision: Supervision) -> Self {
        self.supervision = Some(supervision);
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn policy(&self) -> VotePolicy {
        self.policy
    }

    pub fn supervision(&self) -> Option<&Supervision> {
        self.supervision.as_ref()
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.kind.response_format()
    }
}
