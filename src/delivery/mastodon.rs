//! Microblog channel: a status on a Mastodon instance.

use super::{truncate_with_ellipsis, Channel, OutgoingPost, POST_TIMEOUT};
use crate::config::{require, MastodonConfig};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const MAX_STATUS_LENGTH: usize = 500;

#[derive(Debug, Serialize)]
struct NewStatus<'a> {
    status: &'a str,
    visibility: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostedStatus {
    #[serde(default)]
    url: Option<String>,
}

pub struct MastodonChannel {
    client: reqwest::Client,
    statuses_url: String,
    access_token: String,
    visibility: String,
}

impl MastodonChannel {
    pub fn new(config: &MastodonConfig) -> Result<Self> {
        let instance = require(&config.instance_url, "Mastodon instance_url")?;
        let access_token = require(&config.access_token, "Mastodon access_token")?.to_string();
        let visibility = match config.visibility.trim() {
            "" => "public".to_string(),
            v => v.to_string(),
        };
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(POST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            statuses_url: format!("{}/api/v1/statuses", instance.trim_end_matches('/')),
            access_token,
            visibility,
        })
    }
}

#[async_trait]
impl Channel for MastodonChannel {
    fn name(&self) -> &'static str {
        "mastodon"
    }

    async fn post(&self, post: &OutgoingPost<'_>) -> bool {
        let text = post.promo.microblog_text();
        let original_len = text.chars().count();
        let status = truncate_with_ellipsis(text, MAX_STATUS_LENGTH);
        if original_len > MAX_STATUS_LENGTH {
            log::warn!(
                "Mastodon status truncated from {} to {} chars",
                original_len,
                MAX_STATUS_LENGTH
            );
        }

        let response = self
            .client
            .post(&self.statuses_url)
            .bearer_auth(&self.access_token)
            .json(&NewStatus {
                status: &status,
                visibility: &self.visibility,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match response {
            Ok(r) => {
                let url = r
                    .json::<PostedStatus>()
                    .await
                    .ok()
                    .and_then(|s| s.url)
                    .unwrap_or_default();
                log::info!("Posted to Mastodon: {}", url);
                true
            }
            Err(e) => {
                log::warn!("Mastodon post failed: {}", e);
                false
            }
        }
    }
}
