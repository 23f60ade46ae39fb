//! Chat-completion client for report generation
//! Any OpenAI-compatible endpoint is substitutable via LlmConfig

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::LlmConfig;
use crate::data::{DataError, DataResult};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for a hosted text-generation endpoint
pub struct CompletionClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl CompletionClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("marketbrief/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Send one system+user exchange and return the generated text
    /// verbatim. Any non-success response is fatal; no placeholder text
    /// is ever substituted.
    pub async fn complete(&self, system: &str, user: &str) -> DataResult<String> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            DataError::Config("OPENAI_API_KEY not configured".to_string())
        })?;

        info!(
            "Requesting completion from model '{}' (prompt length: {} chars)",
            self.config.model,
            user.len()
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code,
                message: format!("completion request failed: {}", error_text),
            });
        }

        let payload: ChatResponse = response.json().await?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DataError::parse_error("No completion content in response"))?;

        info!("Received completion ({} chars)", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let client = CompletionClient::new(LlmConfig {
            api_key: None,
            base_url: "http://localhost:0".to_string(),
            model: "test".to_string(),
            temperature: 0.2,
            max_tokens: 16,
            timeout_seconds: 5,
        });

        let err = tokio::runtime::Runtime::new()
            .expect("runtime")
            .block_on(client.complete("system", "user"))
            .expect_err("should fail without a key");
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_chat_response_parsing() {
        let payload = serde_json::json!({
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "1. Executive Summary\n..."}, "finish_reason": "stop"}
            ]
        });
        let parsed: ChatResponse = serde_json::from_value(payload).expect("valid payload");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("1. Executive Summary\n...")
        );
    }
}
