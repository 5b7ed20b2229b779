//! Anthropic Messages API backend.

use super::{CompletionRequest, Generator};
use crate::config::{require, AnthropicConfig};
use crate::error::{PromoError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct AnthropicClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(config: &AnthropicConfig) -> Result<Self> {
        let api_key = require(&config.api_key, "Anthropic api_key")?.to_string();
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Generator for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
        };

        log::info!(
            "Sending request to Anthropic: model={}, prompt_len={}",
            self.model,
            request.user.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| PromoError::ContentGeneration(format!("Failed to call Anthropic: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PromoError::ContentGeneration(format!(
                "Anthropic returned {}: {}",
                status, text
            )));
        }

        let result: MessagesResponse = response.json().await.map_err(|e| {
            PromoError::ContentGeneration(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let text = result.text();
        if text.trim().is_empty() {
            return Err(PromoError::ContentGeneration(
                "Anthropic returned no text content".to_string(),
            ));
        }

        log::info!(
            "Anthropic response received: {} chars, stop_reason={:?}",
            text.len(),
            result.stop_reason
        );
        Ok(text)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks; tool-use and other block types are ignored.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}
