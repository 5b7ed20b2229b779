//! Chat webhook channel.

use super::{truncate_with_ellipsis, Channel, OutgoingPost, POST_TIMEOUT};
use crate::config::{require, DiscordConfig};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Texts longer than this are cut to `TRUNCATED_LENGTH` plus `...`,
/// staying under the 2000-character message limit.
const SOFT_LIMIT: usize = 1990;
const TRUNCATED_LENGTH: usize = 1987;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

pub fn fit_message(text: &str) -> String {
    if text.chars().count() > SOFT_LIMIT {
        truncate_with_ellipsis(text, TRUNCATED_LENGTH + 3)
    } else {
        text.to_string()
    }
}

pub struct DiscordChannel {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordChannel {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let webhook_url = require(&config.webhook_url, "Discord webhook_url")?.to_string();
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(POST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            webhook_url,
        })
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn post(&self, post: &OutgoingPost<'_>) -> bool {
        let content = fit_message(&post.promo.text);
        let result = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookMessage { content: &content })
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => {
                log::info!("Posted {} to Discord", post.episode.reference());
                true
            }
            Err(e) => {
                log::warn!("Discord webhook post failed: {}", e);
                false
            }
        }
    }
}
