//! Promotional content generation.
//!
//! Content comes from an ordered list of strategies. Each one may fail; the
//! cascade logs the failure and moves on, and always finishes with the
//! template strategy, which cannot fail.

pub mod summarizer;
pub mod template;
pub mod voices;

use crate::error::{PromoError, Result};
use crate::llm::Generator;
use crate::models::{ContentDraft, Episode, GenerationTier};
use crate::transcript::TranscriptResult;
use async_trait::async_trait;
use template::TemplateInput;

/// Finished promo copy for one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Promo {
    pub text: String,
    /// Shorter rewrite for the microblog channel, when one was produced.
    pub condensed: Option<String>,
    pub draft: ContentDraft,
}

impl Promo {
    pub fn tier(&self) -> GenerationTier {
        self.draft.tier
    }

    pub fn microblog_text(&self) -> &str {
        self.condensed.as_deref().unwrap_or(&self.text)
    }
}

/// Everything a strategy may draw on for one episode.
#[derive(Debug, Clone, Copy)]
pub struct PromoRequest<'a> {
    pub episode: &'a Episode,
    pub episode_url: &'a str,
    pub transcript: &'a TranscriptResult,
}

impl<'a> PromoRequest<'a> {
    fn template_input(&self) -> TemplateInput<'a> {
        TemplateInput {
            episode: self.episode,
            episode_url: self.episode_url,
            transcript_url: self.transcript.url(),
            transcript_html: self.transcript.html(),
        }
    }
}

#[async_trait]
pub trait ContentStrategy: Send + Sync {
    fn tier(&self) -> GenerationTier;

    async fn generate(&self, request: &PromoRequest<'_>) -> Result<Promo>;
}

// ============================================================================
// AI tier
// ============================================================================

pub struct AiStrategy {
    generator: Box<dyn Generator>,
    presenter: String,
    condense_for_microblog: bool,
}

impl AiStrategy {
    pub fn new(generator: Box<dyn Generator>, presenter: &str, condense_for_microblog: bool) -> Self {
        Self {
            generator,
            presenter: presenter.to_string(),
            condense_for_microblog,
        }
    }
}

#[async_trait]
impl ContentStrategy for AiStrategy {
    fn tier(&self) -> GenerationTier {
        GenerationTier::Ai
    }

    async fn generate(&self, request: &PromoRequest<'_>) -> Result<Promo> {
        let html = request.transcript.html().ok_or_else(|| {
            PromoError::ContentGeneration("no transcript markup to summarize".to_string())
        })?;
        let episode = request.episode;

        let draft = summarizer::summarize(self.generator.as_ref(), html, episode).await?;
        if draft.is_empty() {
            return Err(PromoError::ContentGeneration(
                "summary came back empty".to_string(),
            ));
        }

        let voice = voices::voice_for(&episode.show.code);
        let text = summarizer::compose(
            self.generator.as_ref(),
            &draft,
            voice,
            episode,
            request.episode_url,
            &self.presenter,
        )
        .await?;

        let condensed = if self.condense_for_microblog {
            match summarizer::condense_for_microblog(self.generator.as_ref(), &text).await {
                Ok(short) => Some(short),
                Err(e) => {
                    log::warn!("Microblog condensation failed, channel will truncate: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Promo {
            text,
            condensed,
            draft,
        })
    }
}

// ============================================================================
// Template tier
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateStrategy;

impl TemplateStrategy {
    pub fn build(&self, request: &PromoRequest<'_>) -> Promo {
        let input = request.template_input();
        Promo {
            text: template::build_template_promo(&input),
            condensed: None,
            draft: template::template_draft(&input),
        }
    }
}

#[async_trait]
impl ContentStrategy for TemplateStrategy {
    fn tier(&self) -> GenerationTier {
        GenerationTier::Template
    }

    async fn generate(&self, request: &PromoRequest<'_>) -> Result<Promo> {
        Ok(self.build(request))
    }
}

// ============================================================================
// Cascade
// ============================================================================

pub struct ContentCascade {
    strategies: Vec<Box<dyn ContentStrategy>>,
    fallback: TemplateStrategy,
}

impl ContentCascade {
    /// Template only.
    pub fn template_only() -> Self {
        Self {
            strategies: Vec::new(),
            fallback: TemplateStrategy,
        }
    }

    /// AI first when a generator is available, then the template.
    pub fn with_ai(strategy: AiStrategy) -> Self {
        Self {
            strategies: vec![Box::new(strategy)],
            fallback: TemplateStrategy,
        }
    }

    pub fn tiers(&self) -> Vec<GenerationTier> {
        self.strategies
            .iter()
            .map(|s| s.tier())
            .chain(std::iter::once(self.fallback.tier()))
            .collect()
    }

    /// Try each strategy in order; the template is the last resort.
    pub async fn generate(&self, request: &PromoRequest<'_>) -> Promo {
        for strategy in &self.strategies {
            match strategy.generate(request).await {
                Ok(promo) => return promo,
                Err(e) => log::warn!(
                    "{} tier failed for {}, falling back: {}",
                    strategy.tier(),
                    request.episode.reference(),
                    e
                ),
            }
        }
        self.fallback.build(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_episode, FakeGenerator};
    use crate::transcript::Transcript;

    const URL: &str = "https://twit.tv/shows/security-now/episodes/1000";

    fn resolved() -> TranscriptResult {
        TranscriptResult {
            transcript: Some(Transcript {
                url: "https://twit.tv/posts/transcripts/security-now-1000-transcript".to_string(),
                html: "<h1>Transcript</h1><p>[00:00:01]: Leo: Hello there.</p>".to_string(),
            }),
            attempted: vec![],
        }
    }

    const SUMMARY_JSON: &str =
        r#"{"summary": "Packed show.", "topics": ["Passkeys", "Routers", "Email"], "notable_quote": "Steve: patch now"}"#;

    #[tokio::test]
    async fn test_ai_tier_used_when_it_succeeds() {
        let generator = FakeGenerator::replying(&[SUMMARY_JSON, "AI promo body"]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(generator.clone()), "Leo", false));
        let episode = sample_episode("500");
        let transcript = resolved();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.tier(), GenerationTier::Ai);
        assert_eq!(promo.text, "AI promo body");
        assert_eq!(promo.draft.topics.len(), 3);
        assert!(promo.condensed.is_none());
        assert_eq!(generator.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back_to_template() {
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(FakeGenerator::failing()), "Leo", true));
        let episode = sample_episode("500");
        let transcript = resolved();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.tier(), GenerationTier::Template);
        assert!(promo.text.contains(URL));
    }

    #[tokio::test]
    async fn test_empty_summary_falls_back_to_template() {
        let generator = FakeGenerator::replying(&[r#"{"summary": "", "topics": []}"#, "never used"]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(generator.clone()), "Leo", false));
        let episode = sample_episode("500");
        let transcript = resolved();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.tier(), GenerationTier::Template);
        assert_eq!(generator.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_transcript_skips_ai_call() {
        let generator = FakeGenerator::replying(&[SUMMARY_JSON]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(generator.clone()), "Leo", false));
        let episode = sample_episode("500");
        let transcript = TranscriptResult::default();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.tier(), GenerationTier::Template);
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_condensed_text_for_long_promo() {
        let long = "z".repeat(700);
        let generator = FakeGenerator::replying(&[SUMMARY_JSON, long.as_str(), "short version"]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(generator), "Leo", true));
        let episode = sample_episode("500");
        let transcript = resolved();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.text, long);
        assert_eq!(promo.microblog_text(), "short version");
    }

    #[tokio::test]
    async fn test_condense_failure_keeps_ai_promo() {
        let long = "z".repeat(700);
        let generator = FakeGenerator::replying(&[SUMMARY_JSON, long.as_str()]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(generator), "Leo", true));
        let episode = sample_episode("500");
        let transcript = resolved();
        let request = PromoRequest { episode: &episode, episode_url: URL, transcript: &transcript };

        let promo = cascade.generate(&request).await;

        assert_eq!(promo.tier(), GenerationTier::Ai);
        assert_eq!(promo.microblog_text(), long);
    }

    #[test]
    fn test_cascade_tiers() {
        assert_eq!(ContentCascade::template_only().tiers(), vec![GenerationTier::Template]);
        let cascade = ContentCascade::with_ai(AiStrategy::new(Box::new(FakeGenerator::failing()), "Leo", false));
        assert_eq!(cascade.tiers(), vec![GenerationTier::Ai, GenerationTier::Template]);
    }
}
