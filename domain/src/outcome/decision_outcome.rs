//! Decision outcomes and the trail that builds them

use super::audit::AuditEntry;
use super::resolution::{DecisionState, HumanFlagReason, ResolutionPath, Transition};
use crate::core::tier::Tier;
use crate::task::TaskKind;
use crate::validation::{CandidateValue, ValidatedCandidate};
use serde::Serialize;

/// Terminal record of one decision task.
///
/// `value` is only ever set from a [`ValidatedCandidate`], so an accepted
/// value always passed the validator for the task's kind and constraints.
/// Outcomes carry no wall-clock data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    pub kind: TaskKind,
    pub value: Option<CandidateValue>,
    pub path: ResolutionPath,
    pub flag: Option<HumanFlagReason>,
    pub accepted_tier: Option<Tier>,
    /// Oracle responses spent across all stages (transport retries excluded).
    pub votes_used: usize,
    /// Strong-tier calls, including ones that ended in an oracle failure.
    pub strong_calls: usize,
    pub supervisor_invoked: bool,
    pub transitions: Vec<Transition>,
    pub audit: Vec<AuditEntry>,
}

impl DecisionOutcome {
    /// Outcome decided without consulting the oracle.
    pub fn deterministic(kind: TaskKind, value: CandidateValue, note: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value),
            path: ResolutionPath::Deterministic,
            flag: None,
            accepted_tier: None,
            votes_used: 0,
            strong_calls: 0,
            supervisor_invoked: false,
            transitions: vec![Transition {
                from: DecisionState::Start,
                to: DecisionState::Accepted,
                note: note.into(),
            }],
            audit: Vec::new(),
        }
    }

    pub fn is_human_flagged(&self) -> bool {
        self.flag.is_some()
    }

    pub fn escalated(&self) -> bool {
        self.strong_calls > 0
    }
}

/// Accumulates transitions and audit entries while a decision is resolved.
#[derive(Debug, Clone)]
pub struct DecisionTrail {
    kind: TaskKind,
    transitions: Vec<Transition>,
    audit: Vec<AuditEntry>,
    strong_calls: usize,
    supervisor_invoked: bool,
}

impl DecisionTrail {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            transitions: Vec::new(),
            audit: Vec::new(),
            strong_calls: 0,
            supervisor_invoked: false,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn transition(&mut self, from: DecisionState, to: DecisionState, note: impl Into<String>) {
        self.transitions.push(Transition {
            from,
            to,
            note: note.into(),
        });
    }

    pub fn record(&mut self, entries: impl IntoIterator<Item = AuditEntry>) {
        for entry in entries {
            if entry.tier.is_strong() {
                self.strong_calls += 1;
            }
            self.audit.push(entry);
        }
    }

    pub fn mark_supervisor_invoked(&mut self) {
        self.supervisor_invoked = true;
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn votes_used(&self) -> usize {
        self.audit.iter().filter(|entry| entry.is_vote()).count()
    }

    /// Close the trail with an accepted candidate.
    pub fn accept(
        self,
        candidate: ValidatedCandidate,
        tier: Tier,
        path: ResolutionPath,
    ) -> DecisionOutcome {
        self.finish(Some(candidate.value), path, None, Some(tier))
    }

    /// Close the trail in `HUMAN_FLAG`, logging the final transition from `from`.
    pub fn flag(mut self, from: DecisionState, reason: HumanFlagReason) -> DecisionOutcome {
        self.transition(from, DecisionState::HumanFlag, reason.as_str());
        self.finish(None, ResolutionPath::HumanFlagged, Some(reason), None)
    }

    fn finish(
        self,
        value: Option<CandidateValue>,
        path: ResolutionPath,
        flag: Option<HumanFlagReason>,
        accepted_tier: Option<Tier>,
    ) -> DecisionOutcome {
        let votes_used = self.votes_used();
        DecisionOutcome {
            kind: self.kind,
            value,
            path,
            flag,
            accepted_tier,
            votes_used,
            strong_calls: self.strong_calls,
            supervisor_invoked: self.supervisor_invoked,
            transitions: self.transitions,
            audit: self.audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::AuditStage;

    #[test]
    fn test_flag_appends_terminal_transition() {
        let mut trail = DecisionTrail::new(TaskKind::IdentifyTableEndMarker);
        trail.record([
            AuditEntry::rejected(AuditStage::MiniVoting, Tier::Fast, 1, "x", "marker not found"),
            AuditEntry::rejected(AuditStage::StrongResolution, Tier::Strong, 1, "y", "marker not found"),
        ]);
        let outcome = trail.flag(
            DecisionState::StrongResolution,
            HumanFlagReason::FormatInvalidAfterRetries,
        );
        assert_eq!(outcome.path, ResolutionPath::HumanFlagged);
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.votes_used, 2);
        assert!(outcome.escalated());
        assert_eq!(outcome.transitions.last().unwrap().to, DecisionState::HumanFlag);
    }

    #[test]
    fn test_failed_strong_call_counts_as_escalation() {
        let mut trail = DecisionTrail::new(TaskKind::LocateTableBlock);
        trail.record([
            AuditEntry::rejected(AuditStage::MiniVoting, Tier::Fast, 1, "7", "index out of range"),
            AuditEntry::failed(AuditStage::StrongResolution, Tier::Strong, 1, "unavailable"),
        ]);
        let outcome = trail.flag(DecisionState::StrongResolution, HumanFlagReason::OracleUnavailable);
        assert_eq!(outcome.votes_used, 1);
        assert_eq!(outcome.strong_calls, 1);
        assert!(outcome.escalated());
        assert_eq!(outcome.audit.len(), 2);
    }

    #[test]
    fn test_deterministic_outcome_uses_no_votes() {
        let outcome = DecisionOutcome::deterministic(
            TaskKind::LocateTableBlock,
            CandidateValue::Index(0),
            "single candidate block",
        );
        assert_eq!(outcome.votes_used, 0);
        assert_eq!(outcome.path, ResolutionPath::Deterministic);
        assert!(!outcome.is_human_flagged());
    }
}
