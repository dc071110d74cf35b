//! Logging infrastructure: machine-readable outcome records.
//!
//! Provides [`JsonlOutcomeSink`], a JSONL file writer that implements
//! the [`OutcomeSink`](filing_application::OutcomeSink) port.

mod jsonl_sink;

pub use jsonl_sink::JsonlOutcomeSink;
