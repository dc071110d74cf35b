//! Core domain concepts shared across all subdomains.
//!
//! - [`tier::Tier`] - oracle capability tiers (fast, strong)
//! - [`error::DomainError`] - domain-level errors
//! - [`output_format::OutputFormat`] - how batch results are printed
//! - [`text`] - UTF-8 safe string helpers

pub mod error;
pub mod output_format;
pub mod text;
pub mod tier;
