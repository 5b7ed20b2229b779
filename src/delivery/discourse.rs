//! Forum channel: one new topic per episode on a Discourse site.

use super::{truncate_with_ellipsis, Channel, OutgoingPost, POST_TIMEOUT};
use crate::config::{require, DiscourseConfig};
use crate::error::Result;
use crate::models::Episode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const MAX_POST_LENGTH: usize = 32_000;
const EPISODE_TAG: &str = "episode";

/// Parent "TWiT Shows" category, used when a show has no subcategory.
pub const SHOWS_PARENT_CATEGORY: u32 = 5;

/// Show label -> subcategory id under the parent.
const SHOW_CATEGORIES: &[(&str, u32)] = &[
    ("This Week In Tech", 13),
    ("This Week in Tech", 13),
    ("MacBreak Weekly", 14),
    ("iOS Today", 15),
    ("Security Now", 16),
    ("Windows Weekly", 17),
    ("Hands-On Tech", 22),
    ("Tech News Weekly", 32),
    ("This Week in Space", 80),
    ("Hands-On Windows", 81),
    ("Home Theater Geeks", 84),
    ("Untitled Linux Show", 85),
    ("Intelligent Machines", 89),
    ("Hands-On Apple", 90),
];

pub fn category_for(show_label: &str) -> u32 {
    SHOW_CATEGORIES
        .iter()
        .find(|(label, _)| *label == show_label)
        .map(|(_, id)| *id)
        .unwrap_or(SHOWS_PARENT_CATEGORY)
}

/// Topic body, cut to the forum's post length cap.
pub fn fit_post(text: &str) -> String {
    truncate_with_ellipsis(text, MAX_POST_LENGTH)
}

/// `"{code} {number}: {title}"`
pub fn topic_title(episode: &Episode) -> String {
    format!(
        "{} {}: {}",
        episode.show.code,
        episode.number_or_placeholder(),
        episode.title
    )
    .trim()
    .to_string()
}

#[derive(Debug, Serialize)]
struct NewTopic<'a> {
    title: String,
    raw: &'a str,
    category: u32,
    tags: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    #[serde(default)]
    topic_id: Option<u64>,
}

pub struct DiscourseChannel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_username: String,
}

impl DiscourseChannel {
    pub fn new(config: &DiscourseConfig) -> Result<Self> {
        let api_key = require(&config.api_key, "Discourse api_key")?.to_string();
        let api_username = require(&config.api_username, "Discourse api_username")?.to_string();
        let base_url = require(&config.base_url, "Discourse base_url")?
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(POST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            api_key,
            api_username,
        })
    }
}

#[async_trait]
impl Channel for DiscourseChannel {
    fn name(&self) -> &'static str {
        "discourse"
    }

    async fn post(&self, post: &OutgoingPost<'_>) -> bool {
        let body = fit_post(&post.promo.text);
        let topic = NewTopic {
            title: topic_title(post.episode),
            raw: &body,
            category: category_for(&post.episode.show.label),
            tags: vec![EPISODE_TAG],
        };

        let response = self
            .client
            .post(format!("{}/posts.json", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("Api-Username", &self.api_username)
            .json(&topic)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Discourse post failed: {}", e);
                return false;
            }
        };

        match response.json::<CreatedPost>().await {
            Ok(CreatedPost { topic_id: Some(id) }) => {
                log::info!("Discourse topic created: {}/t/{}", self.base_url, id)
            }
            Ok(_) => log::info!("Discourse topic created for {}", topic.title),
            Err(e) => log::debug!("Discourse reply was not JSON: {}", e),
        }
        true
    }
}
