//! Run Batch use case
//!
//! Processes a batch of filings with bounded concurrency. Documents are
//! independent; a cancelled batch stops scheduling, abandons in-flight
//! documents and persists nothing for them.

use super::call_oracle::ResilientOracle;
use super::process_document::ProcessDocumentUseCase;
use super::resolve_decision::EscalationController;
use crate::config::PipelineConfig;
use crate::ports::oracle::OracleClient;
use crate::ports::outcome_sink::OutcomeSink;
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::usage::{UsageMeter, UsageSnapshot};
use filing_domain::{DocumentReport, FilingDocument};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Batch-level counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub documents: usize,
    pub completed: usize,
    pub cancelled: bool,
    /// Completed documents without problems or human flags.
    pub clean: usize,
    pub human_flags: usize,
    pub votes_used: usize,
    pub usage: UsageSnapshot,
}

/// Reports of the completed documents, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub reports: Vec<DocumentReport>,
    pub summary: BatchSummary,
}

/// Use case for running the pipeline over many filings
pub struct RunBatchUseCase<O: OracleClient + 'static> {
    processor: Arc<ProcessDocumentUseCase<O>>,
    usage: Arc<UsageMeter>,
    sink: Arc<dyn OutcomeSink>,
    concurrency: usize,
}

impl<O: OracleClient + 'static> RunBatchUseCase<O> {
    pub fn new(oracle: Arc<O>, config: PipelineConfig, sink: Arc<dyn OutcomeSink>) -> Self {
        let usage = Arc::new(UsageMeter::new());
        let resilient = Arc::new(ResilientOracle::new(
            oracle,
            config.retry.clone(),
            Arc::clone(&usage),
        ));
        let concurrency = config.concurrency.max(1);
        let processor = ProcessDocumentUseCase::new(EscalationController::new(resilient), config);
        Self {
            processor: Arc::new(processor),
            usage,
            sink,
            concurrency,
        }
    }

    /// Execute the batch with default (no-op) progress
    pub async fn execute(
        &self,
        documents: Vec<FilingDocument>,
        cancel: CancellationToken,
    ) -> BatchOutput {
        self.execute_with_progress(documents, cancel, Arc::new(NoProgress))
            .await
    }

    pub async fn execute_with_progress(
        &self,
        documents: Vec<FilingDocument>,
        cancel: CancellationToken,
        progress: Arc<dyn PipelineProgress>,
    ) -> BatchOutput {
        let total = documents.len();
        info!(documents = total, concurrency = self.concurrency, "Starting batch");
        progress.on_batch_start(total);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (position, document) in documents.into_iter().enumerate() {
            let processor = Arc::clone(&self.processor);
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(&progress);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (position, None),
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (position, None),
                    },
                };
                progress.on_document_start(&document.id);
                let report = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    report = processor.execute_with_progress(&document, progress.as_ref()) => {
                        Some(report)
                    }
                };
                (position, report)
            });
        }

        let mut completed = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((position, Some(report))) => {
                    // A report finishing in the same instant as the cancel is dropped.
                    if cancel.is_cancelled() {
                        continue;
                    }
                    self.sink.record_document(&report);
                    progress.on_document_complete(&report);
                    completed.push((position, report));
                }
                Ok((position, None)) => {
                    info!(position, "Document abandoned after cancellation");
                }
                Err(e) => {
                    warn!("Document task join error: {}", e);
                }
            }
        }

        completed.sort_by_key(|(position, _)| *position);
        let reports: Vec<DocumentReport> =
            completed.into_iter().map(|(_, report)| report).collect();
        let cancelled = cancel.is_cancelled();
        let summary = BatchSummary {
            documents: total,
            completed: reports.len(),
            cancelled,
            clean: reports.iter().filter(|r| r.is_clean()).count(),
            human_flags: reports.iter().map(|r| r.human_flags().len()).sum(),
            votes_used: reports.iter().map(|r| r.votes_used()).sum(),
            usage: self.usage.snapshot(),
        };

        if cancelled {
            warn!(
                completed = summary.completed,
                documents = total,
                "Batch cancelled"
            );
        } else {
            info!(
                completed = summary.completed,
                flags = summary.human_flags,
                calls = summary.usage.total_calls(),
                "Batch complete"
            );
        }
        progress.on_batch_complete(cancelled);

        BatchOutput { reports, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::oracle::OracleError;
    use crate::testing::{filing, filing_block, filing_config, filing_oracle};
    use async_trait::async_trait;
    use filing_domain::{Prompt, ResponseFormat, StageOutcome, Tier};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        outcomes: Mutex<Vec<String>>,
        reports: Mutex<Vec<String>>,
    }

    impl OutcomeSink for RecordingSink {
        fn record_outcome(&self, document_id: &str, _outcome: &StageOutcome) {
            self.outcomes.lock().unwrap().push(document_id.to_string());
        }

        fn record_report(&self, report: &DocumentReport) {
            self.reports.lock().unwrap().push(report.document_id.clone());
        }
    }

    /// Cancels the batch on its first call and never answers.
    struct CancellingOracle {
        cancel: CancellationToken,
    }

    #[async_trait]
    impl OracleClient for CancellingOracle {
        async fn complete(
            &self,
            _prompt: &Prompt,
            _tier: Tier,
            _format: ResponseFormat,
        ) -> Result<String, OracleError> {
            self.cancel.cancel();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_batch_reports_in_input_order() {
        let sink = Arc::new(RecordingSink::default());
        let use_case = RunBatchUseCase::new(
            Arc::new(filing_oracle()),
            filing_config().with_concurrency(2),
            sink.clone(),
        );
        let documents = vec![
            filing("first"),
            FilingDocument::new("empty", Vec::new()),
            FilingDocument::new("single", vec![filing_block()]),
        ];

        let output = use_case.execute(documents, CancellationToken::new()).await;

        let ids: Vec<&str> = output.reports.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "empty", "single"]);
        assert_eq!(output.summary.documents, 3);
        assert_eq!(output.summary.completed, 3);
        assert_eq!(output.summary.clean, 2);
        assert!(!output.summary.cancelled);
        assert_eq!(output.summary.usage.strong_calls, 0);
        assert!(output.summary.usage.fast_calls > 0);

        let mut recorded = sink.reports.lock().unwrap().clone();
        recorded.sort();
        assert_eq!(recorded, vec!["empty", "first", "single"]);
        assert_eq!(sink.outcomes.lock().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_persists_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let use_case = RunBatchUseCase::new(Arc::new(filing_oracle()), filing_config(), sink.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let output = use_case.execute(vec![filing("a"), filing("b")], cancel).await;

        assert!(output.reports.is_empty());
        assert!(output.summary.cancelled);
        assert_eq!(output.summary.usage.total_calls(), 0);
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_document_abandons_it() {
        let sink = Arc::new(RecordingSink::default());
        let cancel = CancellationToken::new();
        let oracle = Arc::new(CancellingOracle {
            cancel: cancel.clone(),
        });
        let use_case = RunBatchUseCase::new(oracle, filing_config().with_concurrency(1), sink.clone());

        let output = use_case.execute(vec![filing("a"), filing("b")], cancel).await;

        assert!(output.summary.cancelled);
        assert_eq!(output.summary.completed, 0);
        assert!(sink.outcomes.lock().unwrap().is_empty());
        assert!(sink.reports.lock().unwrap().is_empty());
    }
}
