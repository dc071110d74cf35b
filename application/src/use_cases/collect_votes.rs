//! Voting aggregator
//!
//! Calls the oracle repeatedly for one decision, validates every response at
//! once and stops as soon as a value reaches the majority threshold.

use super::call_oracle::{OracleFailure, ResilientOracle};
use crate::ports::oracle::OracleClient;
use filing_domain::{
    AuditEntry, AuditStage, Constraints, DecisionTask, Prompt, ResponseFormat, TaskKind, Tier,
    ValidatedCandidate, VotePolicy, VoteTally, validate,
};
use std::sync::Arc;
use tracing::debug;

/// Parameters of one voting round.
#[derive(Debug, Clone, Copy)]
pub struct VoteRequest<'a> {
    pub kind: TaskKind,
    pub prompt: &'a Prompt,
    pub constraints: &'a Constraints,
    pub format: ResponseFormat,
    pub tier: Tier,
    pub policy: VotePolicy,
    pub stage: AuditStage,
}

impl<'a> VoteRequest<'a> {
    /// Vote on the task's own prompt and constraints.
    pub fn for_task(task: &'a DecisionTask, tier: Tier, policy: VotePolicy, stage: AuditStage) -> Self {
        Self {
            kind: task.kind(),
            prompt: task.prompt(),
            constraints: task.constraints(),
            format: task.response_format(),
            tier,
            policy,
            stage,
        }
    }
}

/// Result of one voting round.
#[derive(Debug, Clone)]
pub struct VoteCollection {
    pub tier: Tier,
    /// The value that reached the threshold, if any.
    pub consensus: Option<ValidatedCandidate>,
    /// Every validated candidate, kept even without consensus.
    pub tally: VoteTally,
    /// Every call in order, including the one that failed.
    pub audit: Vec<AuditEntry>,
    /// Set when the oracle failed for good; voting stopped there.
    pub failure: Option<OracleFailure>,
}

impl VoteCollection {
    pub fn votes_used(&self) -> usize {
        self.audit.iter().filter(|entry| entry.is_vote()).count()
    }

    pub fn has_valid_candidates(&self) -> bool {
        !self.tally.is_empty()
    }
}

/// Drives repeated oracle calls for a single decision.
pub struct VotingAggregator<O: OracleClient + 'static> {
    oracle: Arc<ResilientOracle<O>>,
}

impl<O: OracleClient + 'static> VotingAggregator<O> {
    pub fn new(oracle: Arc<ResilientOracle<O>>) -> Self {
        Self { oracle }
    }

    /// Collect up to `policy.max_votes()` responses, sequentially.
    pub async fn collect(&self, request: VoteRequest<'_>) -> VoteCollection {
        let threshold = request.policy.majority_threshold();
        let mut tally = VoteTally::new();
        let mut audit = Vec::new();
        let mut consensus = None;
        let mut failure = None;

        for attempt in 1..=request.policy.max_votes() {
            let raw = match self
                .oracle
                .complete(request.prompt, request.tier, request.format)
                .await
            {
                Ok(raw) => raw,
                Err(error) => {
                    audit.push(AuditEntry::failed(
                        request.stage,
                        request.tier,
                        attempt,
                        error.to_string(),
                    ));
                    failure = Some(error);
                    break;
                }
            };

            match validate(request.kind, &raw, request.constraints) {
                Ok(candidate) => {
                    audit.push(AuditEntry::accepted(request.stage, request.tier, attempt, &raw));
                    let count = tally.record(candidate);
                    debug!(
                        kind = %request.kind,
                        tier = %request.tier,
                        attempt,
                        count,
                        "Vote validated"
                    );
                    if count >= threshold {
                        consensus = tally.reached(threshold).cloned();
                        break;
                    }
                }
                Err(rejection) => {
                    debug!(
                        kind = %request.kind,
                        tier = %request.tier,
                        attempt,
                        "Vote rejected: {}",
                        rejection
                    );
                    audit.push(AuditEntry::rejected(
                        request.stage,
                        request.tier,
                        attempt,
                        &raw,
                        rejection.to_string(),
                    ));
                }
            }
        }

        VoteCollection {
            tier: request.tier,
            consensus,
            tally,
            audit,
            failure,
        }
    }
}
