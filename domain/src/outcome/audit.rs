//! Audit trail entries

use crate::core::tier::Tier;
use serde::Serialize;
use std::fmt;

/// Protocol stage an oracle response was collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStage {
    MiniVoting,
    StrongResolution,
    SupervisorCheck,
}

impl fmt::Display for AuditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditStage::MiniVoting => "mini-voting",
            AuditStage::StrongResolution => "strong-resolution",
            AuditStage::SupervisorCheck => "supervisor-check",
        };
        f.write_str(name)
    }
}

/// One oracle call and what came of it: a response judged by the validator,
/// or a terminal oracle failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub stage: AuditStage,
    pub tier: Tier,
    /// 1-based position of the call within its stage.
    pub attempt: usize,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    /// Set when the call ended without a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl AuditEntry {
    pub fn accepted(stage: AuditStage, tier: Tier, attempt: usize, raw: impl Into<String>) -> Self {
        Self {
            stage,
            tier,
            attempt,
            raw: raw.into(),
            rejection: None,
            failure: None,
        }
    }

    pub fn rejected(
        stage: AuditStage,
        tier: Tier,
        attempt: usize,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            tier,
            attempt,
            raw: raw.into(),
            rejection: Some(reason.into()),
            failure: None,
        }
    }

    pub fn failed(stage: AuditStage, tier: Tier, attempt: usize, error: impl Into<String>) -> Self {
        Self {
            stage,
            tier,
            attempt,
            raw: String::new(),
            rejection: None,
            failure: Some(error.into()),
        }
    }

    /// Whether the oracle answered; failed calls do not spend a vote.
    pub fn is_vote(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_valid(&self) -> bool {
        self.is_vote() && self.rejection.is_none()
    }
}
