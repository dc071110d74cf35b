//! Prompt domain
//!
//! Templates for the prompts sent at each decision stage.

mod template;

pub use template::{Prompt, PromptTemplate};
