//! Per-document pipeline driver
//!
//! Runs the extraction stages of one filing in order, each oracle-backed
//! decision going through the [`EscalationController`]:
//!
//! 1. locate the balance sheet block
//! 2. identify the sum units (needs pre-table text)
//! 3. identify the table end marker and crop the table body
//! 4. convert the body to a structured table
//! 5. identify the column dates and pick the value column
//! 6. select the rows of every concept and sum them

use super::resolve_decision::EscalationController;
use crate::config::PipelineConfig;
use crate::ports::oracle::OracleClient;
use crate::ports::progress::{NoProgress, PipelineProgress};
use filing_domain::table::{
    crop_table, marker_search_offset, pre_table_text, table_tail, value_column,
};
use filing_domain::{
    BalanceTable, CandidateValue, Concept, ConceptFigure, DecisionOutcome, DecisionTask,
    DocumentReport, FilingDocument, Supervision, TaskKind,
};
use tracing::{debug, info, warn};

pub struct ProcessDocumentUseCase<O: OracleClient + 'static> {
    controller: EscalationController<O>,
    config: PipelineConfig,
}

impl<O: OracleClient + 'static> ProcessDocumentUseCase<O> {
    pub fn new(controller: EscalationController<O>, config: PipelineConfig) -> Self {
        Self { controller, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn execute(&self, document: &FilingDocument) -> DocumentReport {
        self.execute_with_progress(document, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        document: &FilingDocument,
        progress: &dyn PipelineProgress,
    ) -> DocumentReport {
        let mut run = DocumentRun {
            report: DocumentReport::new(&document.id),
            progress,
        };
        info!(document = %document.id, blocks = document.blocks.len(), "Processing document");

        // 1. table location
        let Some(block_index) = self.locate_table(document, &mut run).await else {
            return run.report;
        };
        let Some(block) = document.blocks.get(block_index) else {
            run.report.problem(format!("block {} does not exist", block_index));
            return run.report;
        };
        run.report.table_block = Some(block_index);

        // 2. pre-table text and units
        let extraction = &self.config.extraction;
        let pre_table = document
            .pre_table_text
            .clone()
            .or_else(|| pre_table_text(block).map(str::to_string));
        let usable_pre_table = pre_table
            .as_deref()
            .filter(|text| text.trim().chars().count() >= extraction.min_pre_table_len);
        match usable_pre_table {
            Some(text) => self.identify_units(text, &mut run).await,
            None => run.report.problem(format!(
                "pre-table text missing or shorter than {} characters; units and column dates skipped",
                extraction.min_pre_table_len
            )),
        }

        // 3. end marker and crop
        let tail = table_tail(block, pre_table.as_deref().unwrap_or_default());
        let search_from = marker_search_offset(tail, extraction.end_marker_min_offset_ratio);
        let task = DecisionTask::end_marker(
            tail,
            search_from,
            self.config.voting.for_kind(TaskKind::IdentifyTableEndMarker),
        );
        let outcome = self.controller.resolve(&task).await;
        let body = match outcome.value.as_ref().and_then(CandidateValue::as_marker) {
            Some(marker) => crop_table(tail, marker, search_from).unwrap_or(tail),
            None => {
                run.report
                    .problem("table end not identified; using the whole block");
                block.as_str()
            }
        };
        run.record(None, outcome);

        // 4. structured conversion
        let task = DecisionTask::structured_table(
            body,
            extraction.min_table_keys,
            self.config.voting.for_kind(TaskKind::ConvertTableToStructured),
        );
        let outcome = self.controller.resolve(&task).await;
        let table = outcome.value.as_ref().and_then(CandidateValue::as_table).cloned();
        run.record(None, outcome);
        let Some(table) = table else {
            run.report
                .problem("table not converted to structured form; concepts skipped");
            return run.report;
        };

        // 5. column dates
        if let Some(text) = usable_pre_table {
            self.identify_value_column(text, &table, &mut run).await;
        }

        // 6. concepts
        for concept in Concept::ALL {
            self.extract_concept(concept, &table, &mut run).await;
        }

        run.report.table = Some(table);
        info!(
            document = %document.id,
            votes = run.report.votes_used(),
            flags = run.report.human_flags().len(),
            "Document processed"
        );
        run.report
    }

    async fn locate_table(
        &self,
        document: &FilingDocument,
        run: &mut DocumentRun<'_>,
    ) -> Option<usize> {
        match document.blocks.len() {
            0 => {
                warn!(document = %document.id, "Document has no text blocks");
                run.report.problem("no-text-blocks");
                None
            }
            1 => {
                let outcome = DecisionOutcome::deterministic(
                    TaskKind::LocateTableBlock,
                    CandidateValue::Index(0),
                    "single candidate block",
                );
                run.record(None, outcome);
                Some(0)
            }
            _ => {
                let task = DecisionTask::locate_table(
                    &document.blocks,
                    self.config.extraction.min_table_block_len,
                    self.config.voting.for_kind(TaskKind::LocateTableBlock),
                );
                let outcome = self.controller.resolve(&task).await;
                let index = outcome.value.as_ref().and_then(CandidateValue::as_index);
                run.record(None, outcome);
                if index.is_none() {
                    run.report.problem("balance sheet block not located");
                }
                index
            }
        }
    }

    async fn identify_units(&self, pre_table: &str, run: &mut DocumentRun<'_>) {
        let task = DecisionTask::sum_units(
            pre_table,
            self.config.voting.for_kind(TaskKind::IdentifySumUnits),
        );
        let outcome = self.controller.resolve(&task).await;
        match outcome.value.as_ref().and_then(CandidateValue::as_units) {
            Some(units) => {
                run.report.sum_units = Some(units);
                run.report.sum_divider = Some(1_000_000.0 / units as f64);
            }
            None => run.report.problem("sum units not identified"),
        }
        run.record(None, outcome);
    }

    async fn identify_value_column(
        &self,
        pre_table: &str,
        table: &BalanceTable,
        run: &mut DocumentRun<'_>,
    ) {
        let task = DecisionTask::column_dates(
            pre_table,
            self.config.voting.for_kind(TaskKind::IdentifyColumnDates),
        );
        let outcome = self.controller.resolve(&task).await;
        match outcome.value.as_ref().and_then(CandidateValue::as_dates) {
            Some(dates) => {
                let column = value_column(dates, table.median_column_count());
                debug!(column, "Value column selected from {:?}", dates);
                run.report.column_dates = dates.to_vec();
                run.report.value_column = Some(column);
            }
            None => run
                .report
                .problem("column dates not identified; concept sums unavailable"),
        }
        run.record(None, outcome);
    }

    async fn extract_concept(
        &self,
        concept: Concept,
        table: &BalanceTable,
        run: &mut DocumentRun<'_>,
    ) {
        let Some(section) = table.section(concept.section_term()) else {
            run.report.problem(format!(
                "no table section containing '{}'; {} skipped",
                concept.section_term(),
                concept
            ));
            return;
        };
        if section.rows.is_empty() {
            run.report
                .problem(format!("section '{}' has no rows; {} skipped", section.key, concept));
            return;
        }

        let task = DecisionTask::concept_items(
            concept,
            &section,
            self.config.voting.for_kind(TaskKind::ExtractConceptItems),
        )
        .with_supervision(Supervision {
            concept,
            filter: self.config.suspicion.for_concept(concept).clone(),
            policy: self.config.voting.supervisor,
        });
        let outcome = self.controller.resolve(&task).await;
        if let Some(items) = outcome.value.as_ref().and_then(CandidateValue::as_items) {
            let figure = ConceptFigure::compute(concept, &section, items, run.report.value_column);
            debug!(concept = %concept, total = figure.total, "Concept figure computed");
            run.report.figures.push(figure);
        }
        run.record(Some(concept), outcome);
    }
}

/// Report under construction plus the progress callback.
struct DocumentRun<'a> {
    report: DocumentReport,
    progress: &'a dyn PipelineProgress,
}

impl DocumentRun<'_> {
    fn record(&mut self, concept: Option<Concept>, outcome: DecisionOutcome) {
        self.progress
            .on_decision(&self.report.document_id, concept, &outcome);
        self.report.push_outcome(concept, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::testing::{RuleOracle, TABLE_JSON, filing, filing_block, filing_config, filing_oracle};
    use crate::use_cases::call_oracle::ResilientOracle;
    use crate::usage::UsageMeter;
    use filing_domain::{HumanFlagReason, ResolutionPath, Tier};
    use std::sync::Arc;

    fn processor(oracle: &Arc<RuleOracle>) -> ProcessDocumentUseCase<RuleOracle> {
        let resilient = Arc::new(ResilientOracle::new(
            Arc::clone(oracle),
            RetryPolicy::immediate(0),
            Arc::new(UsageMeter::new()),
        ));
        ProcessDocumentUseCase::new(EscalationController::new(resilient), filing_config())
    }

    #[tokio::test]
    async fn test_full_pipeline_on_clean_document() {
        let oracle = Arc::new(filing_oracle());
        let report = processor(&oracle).execute(&filing("0000320193-24-000069")).await;

        assert!(report.is_clean(), "problems: {:?}", report.problems);
        assert_eq!(report.table_block, Some(1));
        assert_eq!(report.sum_units, Some(1_000_000));
        assert_eq!(report.sum_divider, Some(1.0));
        assert_eq!(report.value_column, Some(0));
        assert_eq!(report.outcomes.len(), 7);
        assert_eq!(report.figure(Concept::CurrentCashPosition).unwrap().total, 700);
        assert_eq!(report.figure(Concept::LongTermDebt).unwrap().total, 700);
        assert!(
            report
                .outcomes
                .iter()
                .all(|s| s.outcome.path == ResolutionPath::MiniOnly)
        );
        assert_eq!(oracle.calls_for(Tier::Strong), 0);
    }

    #[tokio::test]
    async fn test_single_block_is_deterministic() {
        let oracle = Arc::new(filing_oracle());
        let document = FilingDocument::new("single", vec![filing_block()]);
        let report = processor(&oracle).execute(&document).await;

        let first = &report.outcomes[0].outcome;
        assert_eq!(first.kind, TaskKind::LocateTableBlock);
        assert_eq!(first.path, ResolutionPath::Deterministic);
        assert_eq!(first.votes_used, 0);
        assert_eq!(report.table_block, Some(0));
    }

    #[tokio::test]
    async fn test_document_without_blocks() {
        let oracle = Arc::new(filing_oracle());
        let report = processor(&oracle)
            .execute(&FilingDocument::new("empty", Vec::new()))
            .await;

        assert!(report.outcomes.is_empty());
        assert_eq!(report.problems, vec!["no-text-blocks".to_string()]);
        assert_eq!(oracle.calls_for(Tier::Fast), 0);
    }

    #[tokio::test]
    async fn test_flagged_end_marker_uses_whole_block() {
        let fast = Tier::Fast;
        let oracle = Arc::new(
            RuleOracle::new()
                .rule("Quote the first line", fast, "Statement of operations")
                .rule("Quote the first line", Tier::Strong, "Statement of operations")
                .rule("text blocks", fast, "1")
                .rule("In which units", fast, "1000")
                .rule("Convert the balance sheet", fast, TABLE_JSON)
                .rule("List the dates", fast, "[]")
                .rule("make up the company's", fast, "[]"),
        );
        let report = processor(&oracle).execute(&filing("flagged")).await;

        let end = report
            .outcomes
            .iter()
            .find(|s| s.outcome.kind == TaskKind::IdentifyTableEndMarker)
            .unwrap();
        assert_eq!(
            end.outcome.flag,
            Some(HumanFlagReason::FormatInvalidAfterRetries)
        );
        assert!(
            report
                .problems
                .contains(&"table end not identified; using the whole block".to_string())
        );
        assert!(report.table.is_some());
        assert_eq!(report.value_column, Some(0));
        assert_eq!(report.figures.len(), 2);
        assert!(report.figures.iter().all(|f| f.lines.is_empty()));
    }

    #[tokio::test]
    async fn test_same_script_same_report() {
        let first = processor(&Arc::new(filing_oracle())).execute(&filing("a")).await;
        let second = processor(&Arc::new(filing_oracle())).execute(&filing("a")).await;
        assert_eq!(first, second);
    }
}
