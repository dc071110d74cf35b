//! Output formatting for batch results

pub mod console;
