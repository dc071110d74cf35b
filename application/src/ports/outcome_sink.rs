//! Port for persisting decision outcomes.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port receives the machine-readable
//! outcome records and their audit trails.

use filing_domain::{DocumentReport, StageOutcome};

/// Port for recording completed documents.
///
/// Only documents that finished processing are handed to the sink; a
/// cancelled document never produces partial records. The methods are
/// synchronous and infallible so persistence problems cannot disturb the
/// pipeline; adapters log their own failures.
pub trait OutcomeSink: Send + Sync {
    /// Record one decision outcome keyed by document and task kind.
    fn record_outcome(&self, document_id: &str, outcome: &StageOutcome);

    /// Record the document-level summary.
    fn record_report(&self, report: &DocumentReport);

    /// Record every outcome of a report followed by the report itself.
    fn record_document(&self, report: &DocumentReport) {
        for outcome in &report.outcomes {
            self.record_outcome(&report.document_id, outcome);
        }
        self.record_report(report);
    }
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoOutcomeSink;

impl OutcomeSink for NoOutcomeSink {
    fn record_outcome(&self, _document_id: &str, _outcome: &StageOutcome) {}
    fn record_report(&self, _report: &DocumentReport) {}
}
