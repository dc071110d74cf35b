//! Majority voting over validated candidates.

mod tally;

pub use tally::VoteTally;
