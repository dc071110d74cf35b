//! OpenAI-compatible chat completion oracle.
//!
//! Each call is one chat completion with the analyst system prompt and the
//! task prompt. Structured tasks request `response_format: json_object`.
//! Retrying is left to the application's resilient caller; this adapter
//! only classifies failures:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | network error, 408, 429, 5xx, empty answer | `Unavailable` |
//! | client timeout | `Timeout` |
//! | `content_filter` finish, refusal, other 4xx | `Refused` |

use crate::config::FileOracleConfig;
use async_trait::async_trait;
use filing_application::{OracleClient, OracleError};
use filing_domain::{Prompt, ResponseFormat, Tier};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while building the oracle client
#[derive(Error, Debug)]
pub enum OracleSetupError {
    #[error("No API key: set {env} or oracle.api_key")]
    MissingApiKey { env: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonMode>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Oracle backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiOracle {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    config: FileOracleConfig,
}

impl OpenAiOracle {
    pub fn new(config: FileOracleConfig) -> Result<Self, OracleSetupError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OracleSetupError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;
        // Per-call timeouts are enforced by the retry policy.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| OracleSetupError::Client(e.to_string()))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            api_key,
            endpoint,
            config,
        })
    }

    fn request<'a>(
        &'a self,
        prompt: &'a Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: self.config.model_for(tier),
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: (format == ResponseFormat::Structured).then_some(JsonMode {
                format_type: "json_object",
            }),
        }
    }
}

#[async_trait]
impl OracleClient for OpenAiOracle {
    async fn complete(
        &self,
        prompt: &Prompt,
        tier: Tier,
        format: ResponseFormat,
    ) -> Result<String, OracleError> {
        let request = self.request(prompt, tier, format);
        debug!(model = request.model, tier = %tier, "Sending chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::Unavailable(format!("unreadable response: {}", e)))?;
        completion_text(parsed)
    }
}

fn transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Unavailable(e.to_string())
    }
}

fn status_error(status: u16, body: &str) -> OracleError {
    let detail = format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>());
    match status {
        408 | 429 | 500..=599 => OracleError::Unavailable(detail),
        _ => OracleError::Refused(detail),
    }
}

fn completion_text(response: ChatResponse) -> Result<String, OracleError> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(OracleError::Unavailable("response without choices".to_string()));
    };
    if let Some(refusal) = choice.message.refusal {
        return Err(OracleError::Refused(refusal));
    }
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(OracleError::Refused("content filter".to_string()));
    }
    choice
        .message
        .content
        .ok_or_else(|| OracleError::Unavailable("response without content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> OpenAiOracle {
        OpenAiOracle::new(FileOracleConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://localhost:9/v1/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn parse(body: &str) -> ChatResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_endpoint_and_model_per_tier() {
        let oracle = oracle();
        assert_eq!(oracle.endpoint, "http://localhost:9/v1/chat/completions");

        let prompt = Prompt::new("system text", "user text");
        let request = oracle.request(&prompt, Tier::Strong, ResponseFormat::Freeform);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-2024-08-06");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user text");
        assert!(json.get("response_format").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_structured_requests_json_mode() {
        let oracle = oracle();
        let prompt = Prompt::new("s", "u");
        let request = oracle.request(&prompt, Tier::Fast, ResponseFormat::Structured);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini-2024-07-18");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenAiOracle::new(FileOracleConfig {
            api_key: None,
            api_key_env: "FILING_QUORUM_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(OracleSetupError::MissingApiKey { .. })));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(status_error(429, "slow down"), OracleError::Unavailable(_)));
        assert!(matches!(status_error(503, ""), OracleError::Unavailable(_)));
        assert!(matches!(status_error(400, "bad"), OracleError::Refused(_)));
        assert!(status_error(502, "").is_retryable());
        assert!(!status_error(403, "").is_retryable());
    }

    #[test]
    fn test_completion_text() {
        let ok = parse(r#"{"choices": [{"message": {"content": "1"}, "finish_reason": "stop"}]}"#);
        assert_eq!(completion_text(ok).unwrap(), "1");

        let filtered = parse(
            r#"{"choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]}"#,
        );
        assert!(matches!(completion_text(filtered), Err(OracleError::Refused(_))));

        let refused = parse(r#"{"choices": [{"message": {"refusal": "I can't help"}}]}"#);
        assert_eq!(
            completion_text(refused),
            Err(OracleError::Refused("I can't help".to_string()))
        );

        let empty = parse(r#"{"choices": []}"#);
        assert!(matches!(completion_text(empty), Err(OracleError::Unavailable(_))));
    }
}
