//! Resolution paths, escalation states and human flag reasons

use serde::Serialize;
use std::fmt;

/// States of the escalation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    Start,
    MiniVoting,
    Accepted,
    StrongFallback,
    StrongResolution,
    SupervisorCheck,
    HumanFlag,
}

impl DecisionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionState::Start => "START",
            DecisionState::MiniVoting => "MINI_VOTING",
            DecisionState::Accepted => "ACCEPTED",
            DecisionState::StrongFallback => "STRONG_FALLBACK",
            DecisionState::StrongResolution => "STRONG_RESOLUTION",
            DecisionState::SupervisorCheck => "SUPERVISOR_CHECK",
            DecisionState::HumanFlag => "HUMAN_FLAG",
        }
    }
}

impl fmt::Display for DecisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: DecisionState,
    pub to: DecisionState,
    pub note: String,
}

/// How a decision was finally resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPath {
    /// Decided without the oracle (e.g. a single candidate block).
    Deterministic,
    MiniOnly,
    StrongFallback,
    SupervisorRevised,
    HumanFlagged,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPath::Deterministic => "deterministic",
            ResolutionPath::MiniOnly => "mini-only",
            ResolutionPath::StrongFallback => "strong-fallback",
            ResolutionPath::SupervisorRevised => "supervisor-revised",
            ResolutionPath::HumanFlagged => "human-flagged",
        }
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to a human-flagged outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HumanFlagReason {
    NoConsensusAfterEscalation,
    OracleUnavailable,
    OracleRefused,
    FormatInvalidAfterRetries,
    /// The suspicion filter still fired after the last supervisor check.
    SuspicionPersisted,
}

impl HumanFlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HumanFlagReason::NoConsensusAfterEscalation => "no-consensus-after-escalation",
            HumanFlagReason::OracleUnavailable => "oracle-unavailable",
            HumanFlagReason::OracleRefused => "oracle-refused",
            HumanFlagReason::FormatInvalidAfterRetries => "format-invalid-after-retries",
            HumanFlagReason::SuspicionPersisted => "suspicion-persisted",
        }
    }
}

impl fmt::Display for HumanFlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_display() {
        let json = serde_json::to_string(&HumanFlagReason::FormatInvalidAfterRetries).unwrap();
        assert_eq!(json, "\"format-invalid-after-retries\"");
        let json = serde_json::to_string(&ResolutionPath::SupervisorRevised).unwrap();
        assert_eq!(json, format!("\"{}\"", ResolutionPath::SupervisorRevised));
        let json = serde_json::to_string(&DecisionState::StrongFallback).unwrap();
        assert_eq!(json, "\"STRONG_FALLBACK\"");
    }
}
