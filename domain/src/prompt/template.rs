//! Prompt templates for each decision stage

use crate::concept::Concept;
use crate::core::text::truncate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Block previews longer than this are cut in the table location prompt.
const BLOCK_PREVIEW_LEN: usize = 1500;

/// A system/user prompt pair sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt shared by every extraction stage
    pub fn analyst_system() -> &'static str {
        r#"You are a meticulous financial analyst reading quarterly and annual SEC filings.
Answer exactly in the requested format, without explanations or extra text."#
    }

    /// System prompt for the supervisor check
    pub fn supervisor_system() -> &'static str {
        r#"You are a senior financial analyst auditing the work of a junior colleague.
Remove every selected balance sheet line that does not belong to the requested figure.
Never add lines that were not selected. Answer in the requested JSON format only."#
    }

    pub fn locate_table<S: AsRef<str>>(blocks: &[S]) -> Prompt {
        let mut user = format!(
            "The filing below was split into {} text blocks. Which block contains the \
             consolidated balance sheet table?\n",
            blocks.len()
        );
        for (index, block) in blocks.iter().enumerate() {
            user.push_str(&format!(
                "\n--- Block {} ---\n{}\n",
                index,
                truncate(block.as_ref(), BLOCK_PREVIEW_LEN)
            ));
        }
        user.push_str("\nAnswer with the block index only, e.g. 0.");
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn sum_units(pre_table_text: &str) -> Prompt {
        let user = format!(
            r#"The following text precedes a balance sheet:

{}

In which units are the amounts of the balance sheet stated?
Answer 1 for single units, 1000 for thousands or 1000000 for millions. Answer with the number only."#,
            pre_table_text
        );
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn end_marker(table_text: &str) -> Prompt {
        let user = format!(
            r#"The text below starts with a balance sheet table and continues with other content:

{}

Quote the first line of text that directly follows the end of the balance sheet table.
Copy it verbatim, without quotes or comments."#,
            table_text
        );
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn structured_table(table_body: &str) -> Prompt {
        let user = format!(
            r#"Convert the balance sheet below into a JSON object.
Nest sub-items under their headings using the row labels as keys.
Every row value is a list with one number per date column, or null when the row has no amounts.
Write negative amounts in parentheses as negative numbers and do not scale the amounts.

{}"#,
            table_body
        );
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn column_dates(pre_table_text: &str) -> Prompt {
        let user = format!(
            r#"The following text precedes a balance sheet:

{}

List the dates of the balance sheet columns from left to right as a JSON list of
strings in the format YYYY-MM-DD. Use "0000-00-00" for a column without a date."#,
            pre_table_text
        );
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn concept_items(concept: Concept, section: &str, row_paths: &[Vec<String>]) -> Prompt {
        let user = format!(
            r#"These are the numbered lines of the "{}" section of a balance sheet:

{}

Which lines together make up the company's {}? Do not select subtotals or totals
that would count an amount twice.
Answer with a JSON object of the form {{"itemIndices": [..]}}; use an empty list if no line applies."#,
            section,
            numbered_rows(row_paths),
            concept.label()
        );
        Prompt::new(Self::analyst_system(), user)
    }

    pub fn supervisor(
        concept: Concept,
        row_paths: &[Vec<String>],
        selected: &BTreeSet<usize>,
    ) -> Prompt {
        let chosen: Vec<String> = selected.iter().map(|i| i.to_string()).collect();
        let user = format!(
            r#"A colleague selected lines [{}] as the company's {} from these balance sheet lines:

{}

Check the selection and return the lines that truly belong to the {}.
Answer with a JSON object of the form {{"itemIndices": [..]}} containing a subset of the selection."#,
            chosen.join(", "),
            concept.label(),
            numbered_rows(row_paths),
            concept.label()
        );
        Prompt::new(Self::supervisor_system(), user)
    }
}

fn numbered_rows(row_paths: &[Vec<String>]) -> String {
    row_paths
        .iter()
        .enumerate()
        .map(|(index, path)| format!("{}: {}", index, path.join(" > ")))
        .collect::<Vec<_>>()
        .join("\n")
}
