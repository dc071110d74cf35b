//! Deterministic oracle stubs for tests.

use crate::config::{ExtractionThresholds, PipelineConfig};
use crate::ports::oracle::{OracleClient, OracleError};
use async_trait::async_trait;
use filing_domain::{FilingDocument, Prompt, ResponseFormat, Tier};
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) const EXHAUSTED: &str = "(script exhausted)";

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Text(String),
    Error(OracleError),
}

impl From<&str> for Scripted {
    fn from(text: &str) -> Self {
        Scripted::Text(text.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub tier: Tier,
    pub prompt: Prompt,
    pub format: ResponseFormat,
}

/// Oracle that replays one queue of responses per tier and records every call.
#[derive(Default)]
pub(crate) struct ScriptedOracle {
    fast: Mutex<VecDeque<Scripted>>,
    strong: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fast<S: Into<Scripted>>(self, responses: impl IntoIterator<Item = S>) -> Self {
        self.fast
            .lock()
            .unwrap()
            .extend(responses.into_iter().map(Into::into));
        self
    }

    pub fn with_strong<S: Into<Scripted>>(self, responses: impl IntoIterator<Item = S>) -> Self {
        self.strong
            .lock()
            .unwrap()
            .extend(responses.into_iter().map(Into::into));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, tier: Tier) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.tier == tier)
            .count()
    }
}

#[async_trait]
impl OracleClient for ScriptedOracle {
    async fn complete(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleError> {
        self.calls.lock().unwrap().push(RecordedCall {
            tier,
            prompt: prompt.clone(),
            format,
        });
        let queue = match tier {
            Tier::Fast => &self.fast,
            Tier::Strong => &self.strong,
        };
        match queue.lock().unwrap().pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Error(error)) => Err(error),
            None => Ok(EXHAUSTED.to_string()),
        }
    }
}

/// Oracle answering by the first rule whose needle occurs in the user prompt.
///
/// Answers do not depend on call order, so it is safe under concurrency.
pub(crate) struct RuleOracle {
    rules: Vec<(String, Tier, String)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RuleOracle {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rule(mut self, needle: &str, tier: Tier, answer: &str) -> Self {
        self.rules
            .push((needle.to_string(), tier, answer.to_string()));
        self
    }

    pub fn calls_for(&self, tier: Tier) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.tier == tier)
            .count()
    }
}

#[async_trait]
impl OracleClient for RuleOracle {
    async fn complete(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleError> {
        self.calls.lock().unwrap().push(RecordedCall {
            tier,
            prompt: prompt.clone(),
            format,
        });
        Ok(self
            .rules
            .iter()
            .find(|(needle, rule_tier, _)| *rule_tier == tier && prompt.user.contains(needle.as_str()))
            .map(|(_, _, answer)| answer.clone())
            .unwrap_or_else(|| EXHAUSTED.to_string()))
    }
}

/// Structured form of [`filing_block`]'s balance sheet.
pub(crate) const TABLE_JSON: &str = r#"{
    "Assets": {
        "Current assets": {
            "Cash and cash equivalents": [500, 400],
            "Short-term investments": [200, 150],
            "Accounts receivable": [300, 280]
        },
        "Total assets": [1000, 830]
    },
    "Liabilities and stockholders' equity": {
        "Current liabilities": {"Accounts payable": [120, 110]},
        "Long-term debt": [700, 650],
        "Total liabilities": [820, 760]
    }
}"#;

pub(crate) const END_MARKER: &str =
    "See accompanying notes to condensed consolidated financial statements.";

/// A text block long enough to hold a balance sheet, with pre-table text.
pub(crate) fn filing_block() -> String {
    let mut block = String::from("CONDENSED CONSOLIDATED BALANCE SHEETS\n(In millions)\n");
    block.push_str(&"The accompanying unaudited statements are presented in millions. ".repeat(45));
    block.push_str("\nASSETS\nCurrent assets:\nCash and cash equivalents $ 500 $ 400\n");
    block.push_str("Short-term investments 200 150\nAccounts receivable 300 280\n");
    block.push_str("Total assets $ 1,000 $ 830\nLIABILITIES\nAccounts payable 120 110\n");
    block.push_str("Long-term debt 700 650\nTotal liabilities 820 760\n");
    block.push_str(END_MARKER);
    block.push_str("\nPage 3");
    block
}

pub(crate) fn filing(id: &str) -> FilingDocument {
    FilingDocument::new(id, vec!["Cover page".to_string(), filing_block()])
}

/// Fast-tier answers that resolve every stage of [`filing`] unanimously.
pub(crate) fn filing_oracle() -> RuleOracle {
    let fast = Tier::Fast;
    RuleOracle::new()
        .rule("text blocks", fast, "1")
        .rule("In which units", fast, "1000000")
        .rule("Quote the first line", fast, END_MARKER)
        .rule("Convert the balance sheet", fast, TABLE_JSON)
        .rule("List the dates", fast, r#"["2024-06-30", "2023-12-31"]"#)
        .rule(
            "make up the company's current cash position",
            fast,
            r#"{"itemIndices": [0, 1]}"#,
        )
        .rule("make up the company's long-term debt", fast, r#"{"itemIndices": [1]}"#)
}

/// Default configuration accepting the small fixture table.
pub(crate) fn filing_config() -> PipelineConfig {
    PipelineConfig::default().with_extraction(ExtractionThresholds {
        min_table_keys: 10,
        ..ExtractionThresholds::default()
    })
}
