//! Vote policies
//!
//! A [`VotePolicy`] bounds how many oracle calls a decision may spend and how
//! many identical validated answers make a majority.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum vote count and majority threshold for one decision.
///
/// # Example
///
/// ```
/// use filing_domain::task::VotePolicy;
///
/// let policy: VotePolicy = "5/3".parse().unwrap();
/// assert_eq!(policy.max_votes(), 5);
/// assert_eq!(policy.majority_threshold(), 3);
///
/// assert!("2/3".parse::<VotePolicy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VotePolicy {
    max_votes: usize,
    majority_threshold: usize,
}

impl VotePolicy {
    /// Table location and concept extraction.
    pub const CONSENSUS: VotePolicy = VotePolicy {
        max_votes: 5,
        majority_threshold: 3,
    };
    /// Lighter tasks such as unit identification.
    pub const LIGHT: VotePolicy = VotePolicy {
        max_votes: 3,
        majority_threshold: 2,
    };
    /// No voting: the first valid answer wins.
    pub const RETRY_UNTIL_VALID: VotePolicy = VotePolicy {
        max_votes: 3,
        majority_threshold: 1,
    };

    pub fn new(max_votes: usize, majority_threshold: usize) -> Result<Self, DomainError> {
        if max_votes == 0 {
            return Err(DomainError::InvalidVotePolicy(
                "max votes must be at least 1".to_string(),
            ));
        }
        if majority_threshold == 0 || majority_threshold > max_votes {
            return Err(DomainError::InvalidVotePolicy(format!(
                "majority threshold {} must be between 1 and {}",
                majority_threshold, max_votes
            )));
        }
        Ok(Self {
            max_votes,
            majority_threshold,
        })
    }

    /// A single call whose answer is accepted if it validates.
    pub fn single() -> Self {
        Self {
            max_votes: 1,
            majority_threshold: 1,
        }
    }

    pub fn max_votes(&self) -> usize {
        self.max_votes
    }

    pub fn majority_threshold(&self) -> usize {
        self.majority_threshold
    }
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self::CONSENSUS
    }
}

impl fmt::Display for VotePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.max_votes, self.majority_threshold)
    }
}

impl FromStr for VotePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (max, threshold) = s.trim().split_once('/').ok_or_else(|| {
            DomainError::InvalidVotePolicy(format!("expected MAX/THRESHOLD, got '{}'", s))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<usize>().map_err(|_| {
                DomainError::InvalidVotePolicy(format!("'{}' is not a count", part.trim()))
            })
        };
        Self::new(parse(max)?, parse(threshold)?)
    }
}

impl TryFrom<String> for VotePolicy {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VotePolicy> for String {
    fn from(policy: VotePolicy) -> Self {
        policy.to_string()
    }
}
