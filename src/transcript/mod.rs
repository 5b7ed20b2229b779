//! Transcript location probing.
//!
//! Transcript pages are published some time after an episode airs, under a
//! slug that is not exposed by the episode API. The resolver guesses a fixed,
//! ordered list of slugs and probes each one until a page validates.

pub mod parser;

use crate::error::{PromoError, Result};
use async_trait::async_trait;
use parser::{slugify, TIMESTAMP_RE};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Literal word every transcript page carries.
const TRANSCRIPT_MARKER: &str = "Transcript";

/// Words dropped when building compact slug variants.
const STOP_WORDS: &[&str] = &["this", "in", "the", "a", "an", "of", "to"];

/// Leading slug prefixes that the transcript site sometimes omits.
const FILLER_PREFIXES: &[&str] = &["this-"];

/// A raw HTTP response: status plus body text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Unauthenticated GET used for probing.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}

/// A validated transcript page.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub url: String,
    pub html: String,
}

/// Outcome of a resolution pass. `transcript` is `None` when nothing has
/// been published yet; `attempted` always lists every URL probed, in order.
#[derive(Debug, Clone, Default)]
pub struct TranscriptResult {
    pub transcript: Option<Transcript>,
    pub attempted: Vec<String>,
}

impl TranscriptResult {
    pub fn url(&self) -> Option<&str> {
        self.transcript.as_ref().map(|t| t.url.as_str())
    }

    pub fn html(&self) -> Option<&str> {
        self.transcript.as_ref().map(|t| t.html.as_str())
    }
}

fn without_stop_words(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty() && !STOP_WORDS.contains(part))
        .collect::<Vec<_>>()
        .join("-")
}

/// Candidate transcript slugs, most likely first, duplicates removed at
/// their first occurrence. No episode number means no candidates.
pub fn generate_candidates(
    show_slug: &str,
    show_label: &str,
    episode_number: Option<&str>,
) -> Vec<String> {
    let number = match episode_number.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => return Vec::new(),
    };

    let show_slug = show_slug.trim().trim_matches('/');
    let mut prefixes: Vec<String> = vec![show_slug.to_string()];
    if let Some(stripped) = FILLER_PREFIXES
        .iter()
        .find_map(|prefix| show_slug.strip_prefix(prefix))
    {
        prefixes.push(stripped.to_string());
    }
    prefixes.push(without_stop_words(show_slug));

    let label_slug = slugify(show_label);
    let compact_label_slug = without_stop_words(&label_slug);
    prefixes.push(label_slug);
    prefixes.push(compact_label_slug);

    let mut candidates: Vec<String> = Vec::with_capacity(prefixes.len());
    for prefix in prefixes.into_iter().filter(|p| !p.is_empty()) {
        let candidate = format!("{}-{}-transcript", prefix, number);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Check that a fetched page is a real transcript and not a placeholder.
pub fn validate_transcript(page: &FetchedPage) -> Result<()> {
    if !(200..300).contains(&page.status) {
        return Err(PromoError::Validation(format!("HTTP status {}", page.status)));
    }
    if !page.body.contains(TRANSCRIPT_MARKER) {
        return Err(PromoError::Validation("missing transcript marker".to_string()));
    }
    if !TIMESTAMP_RE.is_match(&page.body) {
        return Err(PromoError::Validation("no timestamp markers".to_string()));
    }
    Ok(())
}

pub struct TranscriptResolver {
    base_url: String,
    fetcher: Box<dyn PageFetcher>,
}

impl TranscriptResolver {
    pub fn new(base_url: &str, fetcher: Box<dyn PageFetcher>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    pub fn candidate_urls(
        &self,
        show_slug: &str,
        show_label: &str,
        episode_number: Option<&str>,
    ) -> Vec<String> {
        generate_candidates(show_slug, show_label, episode_number)
            .into_iter()
            .map(|slug| format!("{}/{}", self.base_url, slug))
            .collect()
    }

    /// Fetch one candidate. Network errors and invalid pages both yield `None`.
    pub async fn probe(&self, url: &str) -> Option<String> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Transcript fetch failed for {}: {}", url, e);
                return None;
            }
        };
        match validate_transcript(&page) {
            Ok(()) => Some(page.body),
            Err(e) => {
                log::debug!("Transcript candidate {} rejected: {}", url, e);
                None
            }
        }
    }

    /// Probe candidates in order and stop at the first valid page.
    pub async fn resolve(
        &self,
        show_slug: &str,
        show_label: &str,
        episode_number: Option<&str>,
    ) -> TranscriptResult {
        let mut result = TranscriptResult::default();
        for url in self.candidate_urls(show_slug, show_label, episode_number) {
            result.attempted.push(url.clone());
            if let Some(html) = self.probe(&url).await {
                log::info!("Transcript found at {}", url);
                result.transcript = Some(Transcript { url, html });
                return result;
            }
        }
        log::debug!(
            "No transcript among {} candidates: {}",
            result.attempted.len(),
            result.attempted.join(", ")
        );
        result
    }
}
