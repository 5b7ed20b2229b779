//! Episode source: the network's REST API.
//!
//! Upstream JSON is decoded into loose DTOs and converted into [`Episode`]
//! records here. Records that cannot become a valid episode are dropped with
//! a warning so one bad entry never sinks the whole list.

pub mod shows;

use crate::config::TwitConfig;
use crate::error::{PromoError, Result};
use crate::models::{de_opt_id, parse_airing_date, Episode, Show};
use crate::transcript::parser::decode_entities;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SHOW_LABEL: &str = "TWiT Show";
const DEFAULT_TITLE: &str = "New Episode";

/// Anything that can list the most recent episodes, newest first.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn recent_episodes(&self, count: usize) -> Result<Vec<Episode>>;
}

/// A row from the active-shows listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowListing {
    pub id: String,
    pub label: String,
    pub short_code: String,
    pub slug: String,
    pub clean_path: String,
}

pub struct TwitClient {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    app_key: String,
}

impl TwitClient {
    pub fn new(config: &TwitConfig) -> Self {
        if config.app_id.is_empty() || config.app_key.is_empty() {
            log::warn!("TWiT API credentials are not configured; requests may be rejected");
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_key: config.app_key.clone(),
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.api_url, path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("app-id", &self.app_id)
            .header("app-key", &self.app_key)
            .query(query)
            .send()
            .await
            .map_err(|e| PromoError::TransientNetwork(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(PromoError::TransientNetwork(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PromoError::TransientNetwork(format!("Bad JSON from {}: {}", url, e)))
    }

    /// Fetch all active shows.
    pub async fn shows(&self) -> Result<Vec<ShowListing>> {
        let body = self
            .get_json("shows", &[("filter[active]", "1".to_string())])
            .await?;
        let response: ShowsResponse = serde_json::from_value(body)?;
        Ok(response.shows.into_iter().map(ShowListing::from).collect())
    }
}

#[async_trait]
impl EpisodeSource for TwitClient {
    async fn recent_episodes(&self, count: usize) -> Result<Vec<Episode>> {
        log::info!("Fetching {} most recent episodes", count);
        let body = self
            .get_json(
                "episodes",
                &[("sort", "-airingDate".to_string()), ("range", count.to_string())],
            )
            .await?;
        let episodes = episodes_from_json(body)?;
        log::info!("Episode source returned {} episodes", episodes.len());
        Ok(episodes)
    }
}

/// Convert an `/episodes` response body, skipping malformed records.
pub fn episodes_from_json(body: serde_json::Value) -> Result<Vec<Episode>> {
    let response: EpisodesResponse = serde_json::from_value(body)?;
    let mut episodes = Vec::with_capacity(response.episodes.len());
    for (index, raw) in response.episodes.into_iter().enumerate() {
        let converted = serde_json::from_value::<EpisodeDto>(raw)
            .map_err(PromoError::from)
            .and_then(Episode::try_from);
        match converted {
            Ok(episode) => episodes.push(episode),
            Err(e) => log::warn!("Skipping malformed episode record #{}: {}", index, e),
        }
    }
    Ok(episodes)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    #[serde(default)]
    episodes: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EpisodeDto {
    #[serde(deserialize_with = "de_opt_id")]
    id: Option<String>,
    label: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    episode_number: Option<String>,
    airing_date: Option<String>,
    show_notes: Option<String>,
    clean_path: Option<String>,
    teaser: Option<String>,
    #[serde(rename = "metatag_description")]
    metatag_description: Option<String>,
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmbeddedDto {
    shows: Vec<ShowDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ShowDto {
    #[serde(deserialize_with = "de_opt_id")]
    id: Option<String>,
    label: Option<String>,
    clean_path: Option<String>,
    short_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowsResponse {
    #[serde(default)]
    shows: Vec<ShowDto>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Display text arrives HTML-escaped (`Tom &amp; Jerry`).
fn display_text(value: Option<String>) -> Option<String> {
    non_empty(value).map(|v| decode_entities(&v))
}

fn last_segment(path: &str) -> String {
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl From<ShowDto> for ShowListing {
    fn from(dto: ShowDto) -> Self {
        let clean_path = dto.clean_path.unwrap_or_default();
        Self {
            id: dto.id.unwrap_or_default(),
            label: display_text(dto.label).unwrap_or_default(),
            short_code: dto.short_code.unwrap_or_default().trim().to_string(),
            slug: last_segment(&clean_path),
            clean_path,
        }
    }
}

impl TryFrom<EpisodeDto> for Episode {
    type Error = PromoError;

    fn try_from(dto: EpisodeDto) -> Result<Self> {
        let id = dto
            .id
            .ok_or_else(|| PromoError::Validation("episode record has no id".to_string()))?;
        let clean_path = dto.clean_path.unwrap_or_default();

        let show_dto = dto
            .embedded
            .and_then(|e| e.shows.into_iter().next())
            .unwrap_or_default();

        let mut slug = show_dto
            .clean_path
            .as_deref()
            .map(last_segment)
            .unwrap_or_default();
        if slug.is_empty() {
            slug = shows::show_slug_from_path(&clean_path)
                .unwrap_or_default()
                .to_string();
        }

        let code = non_empty(show_dto.short_code)
            .or_else(|| shows::extract_show_code(&clean_path))
            .unwrap_or_default();

        let airing_date = dto.airing_date.as_deref().and_then(|raw| {
            let parsed = parse_airing_date(raw);
            if parsed.is_none() {
                log::warn!("Episode {}: unparseable airing date {:?}", id, raw);
            }
            parsed
        });

        Ok(Episode {
            show: Show {
                slug,
                label: display_text(show_dto.label).unwrap_or_else(|| DEFAULT_SHOW_LABEL.to_string()),
                code,
            },
            episode_number: dto.episode_number,
            title: display_text(dto.label).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            airing_date,
            show_notes: dto.show_notes.unwrap_or_default(),
            clean_path,
            teaser: non_empty(dto.teaser),
            description: non_empty(dto.metatag_description),
            id,
        })
    }
}
