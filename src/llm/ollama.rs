//! Ollama backend for running the AI tier against a local model.
//!
//! Calls the Ollama REST API `/api/generate` endpoint.

use super::{CompletionRequest, Generator};
use crate::config::OllamaConfig;
use crate::error::{PromoError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama client for making API calls
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Generator for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: request.user.clone(),
            system: Some(request.system.clone()),
            stream: false,
            options: Some(GenerateOptions {
                temperature: 0.3,
                num_predict: request.max_tokens as i32,
            }),
        };

        log::info!(
            "Sending request to Ollama: model={}, prompt_len={}",
            self.model,
            request.user.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PromoError::ContentGeneration(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PromoError::ContentGeneration(format!(
                "Ollama returned {}: {}",
                status, text
            )));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            PromoError::ContentGeneration(format!("Failed to parse Ollama response: {}", e))
        })?;

        log::info!(
            "Ollama response received: {} chars, eval_duration={:?}ms",
            result.response.len(),
            result.eval_duration.map(|d| d / 1_000_000)
        );

        if result.response.trim().is_empty() {
            return Err(PromoError::ContentGeneration(
                "Ollama returned an empty response".to_string(),
            ));
        }
        Ok(result.response)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_duration: Option<u64>,
}
