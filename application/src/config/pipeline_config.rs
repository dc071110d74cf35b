//! Pipeline configuration.
//!
//! [`PipelineConfig`] is built once by the driver (usually from the file
//! configuration) and threaded down to every component. There is no
//! module-level mutable state.

use super::retry_policy::RetryPolicy;
use filing_domain::{Concept, SuspicionFilter, TaskKind, VotePolicy};

/// Vote policy per task kind, plus the supervisor's policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingPolicies {
    pub locate_table: VotePolicy,
    pub sum_units: VotePolicy,
    pub end_marker: VotePolicy,
    pub structured_table: VotePolicy,
    pub column_dates: VotePolicy,
    pub concept_items: VotePolicy,
    pub supervisor: VotePolicy,
}

impl Default for VotingPolicies {
    fn default() -> Self {
        Self {
            locate_table: VotePolicy::CONSENSUS,
            sum_units: VotePolicy::LIGHT,
            end_marker: VotePolicy::RETRY_UNTIL_VALID,
            structured_table: VotePolicy::RETRY_UNTIL_VALID,
            column_dates: VotePolicy::CONSENSUS,
            concept_items: VotePolicy::CONSENSUS,
            supervisor: VotePolicy::single(),
        }
    }
}

impl VotingPolicies {
    pub fn for_kind(&self, kind: TaskKind) -> VotePolicy {
        match kind {
            TaskKind::LocateTableBlock => self.locate_table,
            TaskKind::IdentifySumUnits => self.sum_units,
            TaskKind::IdentifyTableEndMarker => self.end_marker,
            TaskKind::ConvertTableToStructured => self.structured_table,
            TaskKind::IdentifyColumnDates => self.column_dates,
            TaskKind::ExtractConceptItems => self.concept_items,
        }
    }
}

/// Thresholds used by the deterministic parts of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionThresholds {
    /// Blocks shorter than this (in characters) cannot hold the balance sheet.
    pub min_table_block_len: usize,
    pub min_pre_table_len: usize,
    /// The end marker must start past this share of the searched text.
    pub end_marker_min_offset_ratio: f64,
    /// Keys across all levels a structured table needs.
    pub min_table_keys: usize,
}

impl Default for ExtractionThresholds {
    fn default() -> Self {
        Self {
            min_table_block_len: 2700,
            min_pre_table_len: 50,
            end_marker_min_offset_ratio: 0.3,
            min_table_keys: 20,
        }
    }
}

/// Suspicion filter per concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspicionFilters {
    pub current_cash_position: SuspicionFilter,
    pub long_term_debt: SuspicionFilter,
}

impl Default for SuspicionFilters {
    fn default() -> Self {
        Self {
            current_cash_position: Concept::CurrentCashPosition.default_filter(),
            long_term_debt: Concept::LongTermDebt.default_filter(),
        }
    }
}

impl SuspicionFilters {
    pub fn for_concept(&self, concept: Concept) -> &SuspicionFilter {
        match concept {
            Concept::CurrentCashPosition => &self.current_cash_position,
            Concept::LongTermDebt => &self.long_term_debt,
        }
    }
}

/// Complete configuration of the extraction pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub voting: VotingPolicies,
    pub retry: RetryPolicy,
    pub extraction: ExtractionThresholds,
    pub suspicion: SuspicionFilters,
    /// Documents processed at the same time.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            voting: VotingPolicies::default(),
            retry: RetryPolicy::default(),
            extraction: ExtractionThresholds::default(),
            suspicion: SuspicionFilters::default(),
            concurrency: 4,
        }
    }
}

impl PipelineConfig {
    // ==================== Builder Methods ====================

    pub fn with_voting(mut self, voting: VotingPolicies) -> Self {
        self.voting = voting;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_extraction(mut self, extraction: ExtractionThresholds) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_suspicion(mut self, suspicion: SuspicionFilters) -> Self {
        self.suspicion = suspicion;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_per_kind() {
        let voting = VotingPolicies::default();
        assert_eq!(voting.for_kind(TaskKind::LocateTableBlock).to_string(), "5/3");
        assert_eq!(voting.for_kind(TaskKind::IdentifySumUnits).to_string(), "3/2");
        assert_eq!(voting.for_kind(TaskKind::IdentifyTableEndMarker).to_string(), "3/1");
        assert_eq!(voting.for_kind(TaskKind::ConvertTableToStructured).to_string(), "3/1");
        assert_eq!(voting.for_kind(TaskKind::ExtractConceptItems).to_string(), "5/3");
        assert_eq!(voting.supervisor.to_string(), "1/1");
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let config = PipelineConfig::default().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_filters_per_concept() {
        let filters = SuspicionFilters::default();
        assert!(
            filters
                .for_concept(Concept::CurrentCashPosition)
                .required
                .contains(&"current".to_string())
        );
        assert!(filters.for_concept(Concept::LongTermDebt).required.is_empty());
    }
}
