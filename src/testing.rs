//! In-memory fakes for the pipeline's external seams.

use crate::api::EpisodeSource;
use crate::delivery::{Channel, OutgoingPost};
use crate::error::{PromoError, Result};
use crate::llm::{CompletionRequest, Generator};
use crate::models::{Episode, Show};
use crate::transcript::{FetchedPage, PageFetcher};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Security Now #1000 "Big Number", no notes, teaser or description.
pub fn sample_episode(id: &str) -> Episode {
    Episode {
        id: id.to_string(),
        show: Show {
            slug: "security-now".to_string(),
            label: "Security Now".to_string(),
            code: "SN".to_string(),
        },
        episode_number: Some("1000".to_string()),
        title: "Big Number".to_string(),
        airing_date: Some(Utc.with_ymd_and_hms(2025, 3, 18, 20, 0, 0).unwrap()),
        show_notes: String::new(),
        clean_path: "/shows/security-now/episodes/1000".to_string(),
        teaser: None,
        description: None,
    }
}

pub fn transcript_page() -> FetchedPage {
    FetchedPage {
        status: 200,
        body: "<h1>Security Now Transcript</h1><p>[00:00:01]: Leo: It's time for Security Now.</p>"
            .to_string(),
    }
}

// ============================================================================
// Page fetcher
// ============================================================================

#[derive(Default)]
struct FetcherState {
    pages: HashMap<String, FetchedPage>,
    failing: HashSet<String>,
    calls: Vec<String>,
}

/// Serves scripted pages; unknown URLs are a 404.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, page: FetchedPage) {
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
    }

    /// Make `url` fail at the network level.
    pub fn fail(&self, url: &str) {
        self.state.lock().unwrap().failing.insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(url.to_string());
        if state.failing.contains(url) {
            return Err(PromoError::TransientNetwork(format!("connection reset: {}", url)));
        }
        Ok(state.pages.get(url).cloned().unwrap_or(FetchedPage {
            status: 404,
            body: "Not Found".to_string(),
        }))
    }
}

// ============================================================================
// Episode source
// ============================================================================

#[derive(Clone)]
pub struct FakeSource {
    episodes: Option<Vec<Episode>>,
}

impl FakeSource {
    pub fn with(episodes: Vec<Episode>) -> Self {
        Self {
            episodes: Some(episodes),
        }
    }

    pub fn unreachable() -> Self {
        Self { episodes: None }
    }
}

#[async_trait]
impl EpisodeSource for FakeSource {
    async fn recent_episodes(&self, count: usize) -> Result<Vec<Episode>> {
        match &self.episodes {
            Some(episodes) => Ok(episodes.iter().take(count).cloned().collect()),
            None => Err(PromoError::TransientNetwork("episode API unreachable".to_string())),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

#[derive(Default)]
struct GeneratorState {
    replies: VecDeque<String>,
    requests: Vec<CompletionRequest>,
}

/// Returns scripted replies in order, then fails once they run out.
#[derive(Clone, Default)]
pub struct FakeGenerator {
    state: Arc<Mutex<GeneratorState>>,
}

impl FakeGenerator {
    pub fn replying(replies: &[&str]) -> Self {
        let generator = Self::default();
        generator.state.lock().unwrap().replies = replies.iter().map(|r| r.to_string()).collect();
        generator
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        state
            .replies
            .pop_front()
            .ok_or_else(|| PromoError::ContentGeneration("generator unavailable".to_string()))
    }
}

// ============================================================================
// Channel
// ============================================================================

/// Records every post it receives and reports a fixed outcome.
#[derive(Clone)]
pub struct RecordingChannel {
    name: &'static str,
    succeed: bool,
    posts: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingChannel {
    pub fn succeeding(name: &'static str) -> Self {
        Self {
            name,
            succeed: true,
            posts: Arc::default(),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            succeed: false,
            ..Self::succeeding(name)
        }
    }

    /// (episode id, text) pairs in delivery order.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn post(&self, post: &OutgoingPost<'_>) -> bool {
        self.posts
            .lock()
            .unwrap()
            .push((post.episode.id.clone(), post.promo.text.clone()));
        self.succeed
    }
}
