//! Response validation
//!
//! Raw oracle text becomes a [`ValidatedCandidate`] or a [`Rejection`].
//! Deterministic repairs live in [`repair`].

mod candidate;
pub mod repair;
mod validator;

pub use candidate::{CandidateValue, ValidatedCandidate};
pub use validator::{Rejection, validate};
