//! Oracle configuration from TOML (`[oracle]` section)

use super::issue::{ConfigIssue, ConfigIssueCode};
use filing_domain::Tier;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion endpoint and the model per tier.
///
/// # Example
///
/// ```toml
/// [oracle]
/// base_url = "https://api.openai.com/v1"
/// fast_model = "gpt-4o-mini-2024-07-18"
/// strong_model = "gpt-4o-2024-08-06"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub fast_model: String,
    pub strong_model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for FileOracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            fast_model: "gpt-4o-mini-2024-07-18".to_string(),
            strong_model: "gpt-4o-2024-08-06".to_string(),
            max_tokens: 4096,
            temperature: None,
        }
    }
}

impl FileOracleConfig {
    pub fn model_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Fast => &self.fast_model,
            Tier::Strong => &self.strong_model,
        }
    }

    /// API key from the config file, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, model) in [("fast_model", &self.fast_model), ("strong_model", &self.strong_model)] {
            if model.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: field.to_string(),
                    },
                    format!("oracle.{}: model name cannot be empty", field),
                ));
            }
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "oracle.temperature".to_string(),
                    value: temperature.to_string(),
                },
                "oracle.temperature must be between 0 and 2",
            ));
        }
        issues
    }
}
