//! Single-turn text generation backends.
//!
//! Every call carries one system instruction and one user message and
//! returns the raw text of the reply. Anthropic is the default backend;
//! a local Ollama server can stand in for it.

pub mod anthropic;
pub mod ollama;

use crate::config::{AiProvider, Config};
use crate::error::Result;
use async_trait::async_trait;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Build the configured backend. Fails with a configuration error when the
/// selected provider lacks credentials, in which case the AI tier is skipped.
pub fn from_config(config: &Config) -> Result<Box<dyn Generator>> {
    match config.ai.provider {
        AiProvider::Anthropic => Ok(Box::new(AnthropicClient::new(&config.anthropic)?)),
        AiProvider::Ollama => Ok(Box::new(OllamaClient::new(&config.ollama))),
    }
}

/// Extract a JSON value from an LLM reply: bare JSON, a fenced block, or the
/// first balanced object embedded in prose.
pub fn extract_json_from_response(response: &str) -> Option<serde_json::Value> {
    let trimmed = response.trim();

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Some(json);
    }

    if let Some(inner) = fenced_block(trimmed) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(inner) {
            return Some(json);
        }
    }

    let start = trimmed.find('{')?;
    let end = matching_brace(&trimmed[start..])?;
    serde_json::from_str::<serde_json::Value>(&trimmed[start..start + end]).ok()
}

/// Body of the first ``` fence, with any language tag dropped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```").unwrap_or(body.len());
    Some(body[..close].trim())
}

/// Byte length of the balanced `{...}` at the start of `text`, skipping
/// braces inside string literals.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
