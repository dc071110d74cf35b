//! Progress notification port
//!
//! Defines the interface for reporting progress while a batch of filings is
//! processed.

use filing_domain::{Concept, DecisionOutcome, DocumentReport};

/// Callback for progress updates during a batch run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, ...).
pub trait PipelineProgress: Send + Sync {
    /// Called once before any document is scheduled
    fn on_batch_start(&self, total_documents: usize);

    /// Called when a document starts processing
    fn on_document_start(&self, _document_id: &str) {}

    /// Called after every resolved decision
    fn on_decision(
        &self,
        _document_id: &str,
        _concept: Option<Concept>,
        _outcome: &DecisionOutcome,
    ) {
    }

    /// Called when a document finished all stages
    fn on_document_complete(&self, report: &DocumentReport);

    /// Called when the batch is over, cancelled or not
    fn on_batch_complete(&self, _cancelled: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgress for NoProgress {
    fn on_batch_start(&self, _total_documents: usize) {}
    fn on_document_complete(&self, _report: &DocumentReport) {}
}
