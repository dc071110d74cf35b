//! Decision outcomes, resolution paths, audit trails and document reports.

mod audit;
mod decision_outcome;
mod document_report;
mod resolution;

pub use audit::{AuditEntry, AuditStage};
pub use decision_outcome::{DecisionOutcome, DecisionTrail};
pub use document_report::{DocumentReport, StageOutcome};
pub use resolution::{DecisionState, HumanFlagReason, ResolutionPath, Transition};
