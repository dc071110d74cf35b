//! Escalation controller
//!
//! Resolves one [`DecisionTask`] into a [`DecisionOutcome`]:
//!
//! ```text
//! START -> MINI_VOTING -> ACCEPTED
//!                      -> STRONG_FALLBACK -> STRONG_RESOLUTION -> ACCEPTED | HUMAN_FLAG
//! ACCEPTED -> SUPERVISOR_CHECK -> ACCEPTED | HUMAN_FLAG | STRONG_FALLBACK (once)
//! ```
//!
//! The supervisor check only runs for tasks that declare a [`Supervision`]
//! and only when the suspicion filter fires on the accepted selection.

use super::call_oracle::ResilientOracle;
use super::collect_votes::{VoteRequest, VotingAggregator};
use crate::ports::oracle::OracleClient;
use filing_domain::{
    AuditStage, DecisionOutcome, DecisionState, DecisionTask, DecisionTrail, HumanFlagReason,
    PromptTemplate, ResolutionPath, Supervision, Tier, ValidatedCandidate, VotePolicy,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// A validated candidate and the tier that produced it.
struct Acceptance {
    candidate: ValidatedCandidate,
    tier: Tier,
}

pub struct EscalationController<O: OracleClient + 'static> {
    aggregator: VotingAggregator<O>,
}

impl<O: OracleClient + 'static> EscalationController<O> {
    pub fn new(oracle: Arc<ResilientOracle<O>>) -> Self {
        Self {
            aggregator: VotingAggregator::new(oracle),
        }
    }

    /// Run the protocol for one task. Never fails: unresolved decisions end
    /// as human-flagged outcomes.
    pub async fn resolve(&self, task: &DecisionTask) -> DecisionOutcome {
        let mut trail = DecisionTrail::new(task.kind());
        log_transition(
            &mut trail,
            DecisionState::Start,
            DecisionState::MiniVoting,
            format!("fast tier, policy {}", task.policy()),
        );

        let mini = self
            .aggregator
            .collect(VoteRequest::for_task(
                task,
                Tier::Fast,
                task.policy(),
                AuditStage::MiniVoting,
            ))
            .await;
        let saw_valid = mini.has_valid_candidates();
        let summary = mini.tally.summary();
        let votes = mini.votes_used();
        trail.record(mini.audit);

        if let Some(failure) = mini.failure {
            return flag(trail, DecisionState::MiniVoting, failure.flag_reason());
        }

        let accepted = match mini.consensus {
            Some(candidate) => {
                log_transition(
                    &mut trail,
                    DecisionState::MiniVoting,
                    DecisionState::Accepted,
                    format!("majority for {} after {} votes", candidate.value, votes),
                );
                Acceptance {
                    candidate,
                    tier: Tier::Fast,
                }
            }
            None => {
                log_transition(
                    &mut trail,
                    DecisionState::MiniVoting,
                    DecisionState::StrongFallback,
                    format!("no majority in {} votes ({})", votes, summary),
                );
                match self.strong_resolution(task, &mut trail, saw_valid).await {
                    Ok(acceptance) => acceptance,
                    Err(reason) => return flag(trail, DecisionState::StrongResolution, reason),
                }
            }
        };

        match task.supervision() {
            Some(supervision) => self.supervise(task, supervision, accepted, trail).await,
            None => accept(trail, accepted, false),
        }
    }

    /// One strong-tier call without voting.
    ///
    /// `saw_valid` tells whether earlier stages produced any valid candidate;
    /// it selects the reason code when the strong answer is invalid too.
    async fn strong_resolution(
        &self,
        task: &DecisionTask,
        trail: &mut DecisionTrail,
        saw_valid: bool,
    ) -> Result<Acceptance, HumanFlagReason> {
        log_transition(
            trail,
            DecisionState::StrongFallback,
            DecisionState::StrongResolution,
            "strong tier, single call",
        );
        let strong = self
            .aggregator
            .collect(VoteRequest::for_task(
                task,
                Tier::Strong,
                VotePolicy::single(),
                AuditStage::StrongResolution,
            ))
            .await;
        trail.record(strong.audit);

        if let Some(failure) = strong.failure {
            return Err(failure.flag_reason());
        }
        match strong.consensus {
            Some(candidate) => {
                log_transition(
                    trail,
                    DecisionState::StrongResolution,
                    DecisionState::Accepted,
                    format!("strong tier answered {}", candidate.value),
                );
                Ok(Acceptance {
                    candidate,
                    tier: Tier::Strong,
                })
            }
            None if saw_valid => Err(HumanFlagReason::NoConsensusAfterEscalation),
            None => Err(HumanFlagReason::FormatInvalidAfterRetries),
        }
    }

    async fn supervise(
        &self,
        task: &DecisionTask,
        supervision: &Supervision,
        mut current: Acceptance,
        mut trail: DecisionTrail,
    ) -> DecisionOutcome {
        let row_paths = task.constraints().row_paths();
        let mut revised = false;
        let mut rerun_available = true;

        loop {
            let Some(selected) = current.candidate.value.as_items().cloned() else {
                return accept(trail, current, revised);
            };
            let flagged = supervision.filter.suspicious_items(&selected, row_paths);
            if flagged.is_empty() {
                return accept(trail, current, revised);
            }

            log_transition(
                &mut trail,
                DecisionState::Accepted,
                DecisionState::SupervisorCheck,
                format!("suspicious rows {:?}", flagged),
            );
            trail.mark_supervisor_invoked();
            let prompt = PromptTemplate::supervisor(supervision.concept, row_paths, &selected);
            let check = self
                .aggregator
                .collect(VoteRequest {
                    kind: task.kind(),
                    prompt: &prompt,
                    constraints: task.constraints(),
                    format: task.response_format(),
                    tier: Tier::Strong,
                    policy: supervision.policy,
                    stage: AuditStage::SupervisorCheck,
                })
                .await;
            trail.record(check.audit);

            if let Some(failure) = check.failure {
                return flag(trail, DecisionState::SupervisorCheck, failure.flag_reason());
            }
            match check.consensus {
                Some(revision)
                    if revision
                        .value
                        .as_items()
                        .is_some_and(|items| items.is_subset(&selected)) =>
                {
                    if revision.value != current.candidate.value {
                        revised = true;
                    }
                    current = Acceptance {
                        candidate: revision,
                        tier: current.tier,
                    };
                }
                Some(revision) => {
                    debug!(
                        "Supervisor answer {} is not a subset of the selection, discarded",
                        revision.value
                    );
                }
                None => debug!("Supervisor gave no valid revision"),
            }

            let still_suspicious = current
                .candidate
                .value
                .as_items()
                .is_some_and(|items| supervision.filter.is_suspicious(items, row_paths));
            if !still_suspicious {
                log_transition(
                    &mut trail,
                    DecisionState::SupervisorCheck,
                    DecisionState::Accepted,
                    format!("supervisor settled on {}", current.candidate.value),
                );
                return accept(trail, current, revised);
            }
            if current.tier.is_strong() || !rerun_available {
                return flag(
                    trail,
                    DecisionState::SupervisorCheck,
                    HumanFlagReason::SuspicionPersisted,
                );
            }

            rerun_available = false;
            log_transition(
                &mut trail,
                DecisionState::SupervisorCheck,
                DecisionState::StrongFallback,
                "suspicion persisted after fast-tier acceptance",
            );
            match self.strong_resolution(task, &mut trail, true).await {
                Ok(acceptance) => {
                    current = acceptance;
                    revised = false;
                }
                Err(reason) => return flag(trail, DecisionState::StrongResolution, reason),
            }
        }
    }
}

fn log_transition(
    trail: &mut DecisionTrail,
    from: DecisionState,
    to: DecisionState,
    note: impl Into<String>,
) {
    let note = note.into();
    debug!(kind = %trail.kind(), "{} -> {}: {}", from, to, note);
    trail.transition(from, to, note);
}

fn accept(trail: DecisionTrail, acceptance: Acceptance, revised: bool) -> DecisionOutcome {
    let path = if revised {
        ResolutionPath::SupervisorRevised
    } else if acceptance.tier.is_strong() {
        ResolutionPath::StrongFallback
    } else {
        ResolutionPath::MiniOnly
    };
    debug!(kind = %trail.kind(), path = %path, "Decision accepted: {}", acceptance.candidate.value);
    trail.accept(acceptance.candidate, acceptance.tier, path)
}

fn flag(trail: DecisionTrail, from: DecisionState, reason: HumanFlagReason) -> DecisionOutcome {
    warn!(kind = %trail.kind(), reason = %reason, "Decision flagged for human review");
    trail.flag(from, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::oracle::OracleError;
    use crate::testing::{Scripted, ScriptedOracle};
    use crate::usage::UsageMeter;
    use filing_domain::{
        CandidateValue, Concept, SuspicionFilter, TableRow, TableSection, table::marker_search_offset,
    };
    use std::collections::BTreeSet;

    fn controller(oracle: &Arc<ScriptedOracle>) -> EscalationController<ScriptedOracle> {
        EscalationController::new(Arc::new(ResilientOracle::new(
            Arc::clone(oracle),
            RetryPolicy::immediate(2),
            Arc::new(UsageMeter::new()),
        )))
    }

    fn locate_task() -> DecisionTask {
        let blocks = vec!["a".repeat(3000), "b".repeat(3000), "c".repeat(3000)];
        DecisionTask::locate_table(&blocks, 2700, VotePolicy::CONSENSUS)
    }

    fn section(labels: &[&[&str]]) -> TableSection {
        TableSection {
            key: "Liabilities".to_string(),
            rows: labels
                .iter()
                .enumerate()
                .map(|(index, path)| TableRow {
                    index,
                    path: path.iter().map(|l| l.to_string()).collect(),
                    values: vec![Some(100)],
                })
                .collect(),
        }
    }

    fn debt_task() -> DecisionTask {
        let section = section(&[
            &["Accounts payable"],
            &["Accrued expenses"],
            &["Long-term debt"],
            &["Deferred tax liabilities"],
        ]);
        DecisionTask::concept_items(Concept::LongTermDebt, &section, VotePolicy::CONSENSUS)
            .with_supervision(Supervision {
                concept: Concept::LongTermDebt,
                filter: SuspicionFilter::long_term_debt(),
                policy: VotePolicy::single(),
            })
    }

    fn items(values: &[usize]) -> Option<CandidateValue> {
        Some(CandidateValue::Items(values.iter().copied().collect::<BTreeSet<_>>()))
    }

    #[tokio::test]
    async fn test_majority_at_third_vote_is_mini_only() {
        let oracle = Arc::new(ScriptedOracle::new().with_fast(["1", "1", "1", "0", "2"]));
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.value, Some(CandidateValue::Index(1)));
        assert_eq!(outcome.path, ResolutionPath::MiniOnly);
        assert_eq!(outcome.votes_used, 3);
        assert_eq!(outcome.accepted_tier, Some(Tier::Fast));
        assert_eq!(oracle.calls_for(Tier::Fast), 3);
        assert_eq!(oracle.calls_for(Tier::Strong), 0);
        assert!(!outcome.escalated());
    }

    #[tokio::test]
    async fn test_no_majority_falls_back_to_strong() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(["0", "1", "2", "0", "1"])
                .with_strong(["1"]),
        );
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.value, Some(CandidateValue::Index(1)));
        assert_eq!(outcome.path, ResolutionPath::StrongFallback);
        assert_eq!(outcome.votes_used, 6);
        assert_eq!(oracle.calls_for(Tier::Strong), 1);
        let states: Vec<_> = outcome.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                DecisionState::MiniVoting,
                DecisionState::StrongFallback,
                DecisionState::StrongResolution,
                DecisionState::Accepted,
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_strong_answer_after_split_vote() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(["0", "1", "2", "0", "1"])
                .with_strong(["7"]),
        );
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.value, None);
        assert_eq!(outcome.flag, Some(HumanFlagReason::NoConsensusAfterEscalation));
        assert_eq!(outcome.path, ResolutionPath::HumanFlagged);
    }

    #[tokio::test]
    async fn test_end_marker_never_found_is_format_invalid() {
        let source = "Assets\nCash 10\nTotal assets 10\nTotal liabilities 4\nSee notes to the statements";
        let task = DecisionTask::end_marker(
            source,
            marker_search_offset(source, 0.3),
            VotePolicy::RETRY_UNTIL_VALID,
        );
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(["Statement of cash flows", "Revenue}", "Income statement"])
                .with_strong(["Comprehensive income"]),
        );
        let outcome = controller(&oracle).resolve(&task).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::FormatInvalidAfterRetries));
        assert_eq!(outcome.votes_used, 4);
        assert_eq!(oracle.calls_for(Tier::Fast), 3);
        assert_eq!(oracle.calls_for(Tier::Strong), 1);
        assert!(outcome.audit.iter().all(|entry| !entry.is_valid()));
        assert_eq!(outcome.transitions.last().unwrap().to, DecisionState::HumanFlag);
    }

    #[tokio::test]
    async fn test_refusal_flags_immediately() {
        let oracle = Arc::new(ScriptedOracle::new().with_fast([
            Scripted::from("1"),
            Scripted::Error(OracleError::Refused("content policy".to_string())),
        ]));
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::OracleRefused));
        assert_eq!(oracle.calls_for(Tier::Strong), 0);
    }

    #[tokio::test]
    async fn test_unavailable_oracle_flags_with_distinct_reason() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(vec![Scripted::Error(OracleError::Unavailable("down".to_string())); 3]),
        );
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::OracleUnavailable));
        assert_eq!(outcome.votes_used, 0);
    }

    #[tokio::test]
    async fn test_supervisor_narrows_suspicious_selection() {
        let selection = r#"{"itemIndices": [2, 3]}"#;
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast([selection, selection, selection])
                .with_strong([r#"{"itemIndices": [2]}"#]),
        );
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        assert_eq!(outcome.value, items(&[2]));
        assert_eq!(outcome.path, ResolutionPath::SupervisorRevised);
        assert!(outcome.supervisor_invoked);
        assert_eq!(oracle.calls_for(Tier::Strong), 1);
        let supervisor_call = &oracle.calls()[3];
        assert_eq!(supervisor_call.prompt.system, PromptTemplate::supervisor_system());
        assert!(supervisor_call.prompt.user.contains("[2, 3]"));
    }

    #[tokio::test]
    async fn test_clean_selection_skips_supervisor() {
        let selection = r#"{"itemIndices": [2]}"#;
        let oracle = Arc::new(ScriptedOracle::new().with_fast([selection, selection, selection]));
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        assert_eq!(outcome.path, ResolutionPath::MiniOnly);
        assert!(!outcome.supervisor_invoked);
        assert_eq!(oracle.calls_for(Tier::Strong), 0);
    }

    #[tokio::test]
    async fn test_supervisor_superset_is_discarded() {
        let selection = r#"{"itemIndices": [2, 3]}"#;
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast([selection, selection, selection])
                .with_strong([
                    r#"{"itemIndices": [0, 2, 3]}"#,
                    r#"{"itemIndices": [2]}"#,
                ]),
        );
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        // Discarded revision leaves the fast-tier answer suspicious, so the
        // decision is re-run once at the strong tier.
        assert_eq!(outcome.value, items(&[2]));
        assert_eq!(outcome.path, ResolutionPath::StrongFallback);
        assert_eq!(outcome.accepted_tier, Some(Tier::Strong));
    }

    #[tokio::test]
    async fn test_invalid_supervisor_answer_keeps_selection_and_reruns() {
        let selection = r#"{"itemIndices": [2, 3]}"#;
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast([selection, selection, selection])
                .with_strong([r#"{"itemIndices": [7]}"#, r#"{"itemIndices": [2]}"#]),
        );
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        let supervisor_entry = outcome
            .audit
            .iter()
            .find(|entry| entry.stage == AuditStage::SupervisorCheck)
            .unwrap();
        assert!(supervisor_entry.rejection.is_some());
        let to_states: Vec<_> = outcome.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            &to_states[..4],
            &[
                DecisionState::MiniVoting,
                DecisionState::Accepted,
                DecisionState::SupervisorCheck,
                DecisionState::StrongFallback,
            ]
        );
        // the rejected revision left [2, 3] in place, so the strong re-run decides
        let rerun_call = &oracle.calls()[4];
        assert_eq!(rerun_call.tier, Tier::Strong);
        assert_ne!(rerun_call.prompt.system, PromptTemplate::supervisor_system());
        assert_eq!(outcome.value, items(&[2]));
        assert_eq!(outcome.path, ResolutionPath::StrongFallback);
        assert_eq!(oracle.calls_for(Tier::Strong), 2);
    }

    #[tokio::test]
    async fn test_strong_failure_still_counts_as_escalation() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(["0", "1", "2", "0", "1"])
                .with_strong(vec![Scripted::Error(OracleError::Unavailable("down".to_string())); 3]),
        );
        let outcome = controller(&oracle).resolve(&locate_task()).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::OracleUnavailable));
        assert_eq!(outcome.votes_used, 5);
        assert_eq!(outcome.strong_calls, 1);
        assert!(outcome.escalated());
        let last = outcome.audit.last().unwrap();
        assert_eq!(last.stage, AuditStage::StrongResolution);
        assert!(last.failure.is_some());
    }

    #[tokio::test]
    async fn test_persistent_suspicion_gets_two_chances_then_flag() {
        let selection = r#"{"itemIndices": [2, 3]}"#;
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast([selection, selection, selection])
                .with_strong([selection, selection, selection]),
        );
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::SuspicionPersisted));
        assert_eq!(outcome.value, None);
        // supervisor, strong re-run, supervisor again
        assert_eq!(oracle.calls_for(Tier::Strong), 3);
        let to_states: Vec<_> = outcome.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            to_states,
            vec![
                DecisionState::MiniVoting,
                DecisionState::Accepted,
                DecisionState::SupervisorCheck,
                DecisionState::StrongFallback,
                DecisionState::StrongResolution,
                DecisionState::Accepted,
                DecisionState::SupervisorCheck,
                DecisionState::HumanFlag,
            ]
        );
    }

    #[tokio::test]
    async fn test_strong_acceptance_with_persistent_suspicion_flags_at_once() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_fast(["[0]", "[1]", "[2]", "[3]", "[]"])
                .with_strong(["[3]", "[3]"]),
        );
        let outcome = controller(&oracle).resolve(&debt_task()).await;

        assert_eq!(outcome.flag, Some(HumanFlagReason::SuspicionPersisted));
        assert_eq!(oracle.calls_for(Tier::Strong), 2);
    }

    #[tokio::test]
    async fn test_identical_scripts_give_identical_outcomes() {
        let script = ["0", "nonsense", "2", "0", "1"];
        let first = Arc::new(ScriptedOracle::new().with_fast(script).with_strong(["2"]));
        let second = Arc::new(ScriptedOracle::new().with_fast(script).with_strong(["2"]));
        let a = controller(&first).resolve(&locate_task()).await;
        let b = controller(&second).resolve(&locate_task()).await;
        assert_eq!(a, b);
    }
}
