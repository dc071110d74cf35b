//! Vote tally
//!
//! Counts validated candidates by normalized value. The first candidate seen
//! for a value is kept as its representative.

use crate::validation::ValidatedCandidate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct TallyEntry {
    key: String,
    count: usize,
    candidate: ValidatedCandidate,
}

/// Multiset of validated candidates.
///
/// # Example
///
/// ```
/// use filing_domain::quorum::VoteTally;
/// use filing_domain::validation::{CandidateValue, ValidatedCandidate};
///
/// let mut tally = VoteTally::new();
/// for raw in ["1", "1", "0"] {
///     let index = raw.parse().unwrap();
///     tally.record(ValidatedCandidate::new(CandidateValue::Index(index), raw));
/// }
/// assert_eq!(tally.total(), 3);
/// assert_eq!(tally.reached(2).map(|c| &c.value), Some(&CandidateValue::Index(1)));
/// assert!(tally.reached(3).is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoteTally {
    entries: Vec<TallyEntry>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate and return the updated count for its value.
    pub fn record(&mut self, candidate: ValidatedCandidate) -> usize {
        let key = candidate.vote_key();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.count += 1;
            return entry.count;
        }
        self.entries.push(TallyEntry {
            key,
            count: 1,
            candidate,
        });
        1
    }

    /// Total number of validated candidates recorded.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value with the highest count; the earliest value wins ties.
    pub fn leader(&self) -> Option<(&ValidatedCandidate, usize)> {
        self.entries
            .iter()
            .fold(None, |best: Option<&TallyEntry>, entry| match best {
                Some(b) if b.count >= entry.count => Some(b),
                _ => Some(entry),
            })
            .map(|entry| (&entry.candidate, entry.count))
    }

    /// The value whose count reached `threshold`, if any.
    pub fn reached(&self, threshold: usize) -> Option<&ValidatedCandidate> {
        self.leader()
            .filter(|(_, count)| *count >= threshold)
            .map(|(candidate, _)| candidate)
    }

    /// One representative per distinct value, in first-seen order.
    pub fn distinct(&self) -> Vec<ValidatedCandidate> {
        self.entries.iter().map(|e| e.candidate.clone()).collect()
    }

    /// Short description such as `block 1 x2, block 0 x1`.
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "no valid votes".to_string();
        }
        self.entries
            .iter()
            .map(|e| format!("{} x{}", e.candidate.value, e.count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
