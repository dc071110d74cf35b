//! Domain layer for filing-quorum
//!
//! This crate contains the pure logic of the decision protocol. It has no
//! dependencies on infrastructure, presentation or an async runtime.
//!
//! # Core Concepts
//!
//! ## Decision tasks
//!
//! A [`DecisionTask`] is one oracle-backed decision (locate the balance sheet
//! block, convert it to a structured table, select concept rows, ...). Its
//! [`VotePolicy`] bounds the votes it may spend.
//!
//! ## Validation and voting
//!
//! Every oracle response goes through [`validate`]; only
//! [`ValidatedCandidate`]s are counted by the [`VoteTally`].
//!
//! ## Outcomes
//!
//! A [`DecisionOutcome`] records the accepted value (or a [`HumanFlagReason`]),
//! the [`ResolutionPath`], every state transition and the full audit trail.

pub mod concept;
pub mod core;
pub mod document;
pub mod outcome;
pub mod prompt;
pub mod quorum;
pub mod table;
pub mod task;
pub mod validation;

// Re-export commonly used types
pub use concept::{Concept, ConceptFigure, FigureLine, SuspicionFilter};
pub use crate::core::{error::DomainError, output_format::OutputFormat, tier::Tier};
pub use document::FilingDocument;
pub use outcome::{
    AuditEntry, AuditStage, DecisionOutcome, DecisionState, DecisionTrail, DocumentReport,
    HumanFlagReason, ResolutionPath, StageOutcome, Transition,
};
pub use prompt::{Prompt, PromptTemplate};
pub use quorum::VoteTally;
pub use table::{BalanceTable, TableRow, TableSection};
pub use task::{Constraints, DecisionTask, ResponseFormat, Supervision, TaskKind, VotePolicy};
pub use validation::{CandidateValue, Rejection, ValidatedCandidate, validate};
