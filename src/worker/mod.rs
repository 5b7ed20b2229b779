//! Promotion pipeline orchestrator.
//!
//! One run: load the promoted set, fetch recent episodes, and for each one
//! filter, resolve its transcript, generate copy and deliver it. Episodes are
//! processed strictly one after another. The promoted set is written back
//! once at the end, and only when something new was promoted.

#[cfg(test)]
mod tests;

use crate::api::{EpisodeSource, TwitClient};
use crate::config::RunContext;
use crate::delivery::{build_channels, Channel, OutgoingPost};
use crate::error::Result;
use crate::llm;
use crate::models::{Episode, GenerationTier};
use crate::promo::{AiStrategy, ContentCascade, PromoRequest};
use crate::state::{PromotionRecord, PromotionStore};
use crate::transcript::{HttpFetcher, TranscriptResolver};
use chrono::Utc;
use std::collections::HashSet;
use tracing::Instrument;

/// What happened to one episode during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeOutcome {
    SkippedAlreadyPromoted,
    SkippedTooOld,
    SkippedNoTranscriptYet,
    Promoted {
        tier: GenerationTier,
    },
    /// Delivered, but at least one channel reported failure.
    PartiallyFailed {
        tier: GenerationTier,
        failed_channels: Vec<String>,
    },
    /// Dry run: the text that would have been delivered.
    Previewed {
        tier: GenerationTier,
        text: String,
    },
}

impl EpisodeOutcome {
    /// Whether the episode joins the promoted set.
    pub fn marks_promoted(&self) -> bool {
        matches!(self, Self::Promoted { .. } | Self::PartiallyFailed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SkippedAlreadyPromoted => "already promoted",
            Self::SkippedTooOld => "too old",
            Self::SkippedNoTranscriptYet => "no transcript yet",
            Self::Promoted { .. } => "promoted",
            Self::PartiallyFailed { .. } => "partially failed",
            Self::Previewed { .. } => "previewed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EpisodeReport {
    pub episode_id: String,
    pub reference: String,
    pub outcome: EpisodeOutcome,
}

/// Per-run summary, in episode order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub episodes: Vec<EpisodeReport>,
    pub state_saved: bool,
}

impl RunReport {
    pub fn count(&self, label: &str) -> usize {
        self.episodes
            .iter()
            .filter(|e| e.outcome.label() == label)
            .count()
    }

    pub fn promoted_count(&self) -> usize {
        self.episodes
            .iter()
            .filter(|e| e.outcome.marks_promoted())
            .count()
    }

    pub fn outcome_for(&self, episode_id: &str) -> Option<&EpisodeOutcome> {
        self.episodes
            .iter()
            .find(|e| e.episode_id == episode_id)
            .map(|e| &e.outcome)
    }

    /// (reference, text) for every dry-run preview.
    pub fn previews(&self) -> impl Iterator<Item = (&str, &str)> {
        self.episodes.iter().filter_map(|e| match &e.outcome {
            EpisodeOutcome::Previewed { text, .. } => Some((e.reference.as_str(), text.as_str())),
            _ => None,
        })
    }

    pub fn log_summary(&self) {
        if self.promoted_count() == 0 {
            log::info!("No new episodes ready for promo");
        }
        log::info!(
            "Run finished: {} episodes, {} promoted, {} partially failed, {} previewed, \
             {} already promoted, {} too old, {} awaiting transcript",
            self.episodes.len(),
            self.count("promoted"),
            self.count("partially failed"),
            self.count("previewed"),
            self.count("already promoted"),
            self.count("too old"),
            self.count("no transcript yet"),
        );
    }
}

pub struct PromotionWorker {
    ctx: RunContext,
    source: Box<dyn EpisodeSource>,
    resolver: TranscriptResolver,
    cascade: ContentCascade,
    channels: Vec<Box<dyn Channel>>,
    store: PromotionStore,
}

impl PromotionWorker {
    pub fn new(
        ctx: RunContext,
        source: Box<dyn EpisodeSource>,
        resolver: TranscriptResolver,
        cascade: ContentCascade,
        channels: Vec<Box<dyn Channel>>,
    ) -> Self {
        let store = PromotionStore::new(ctx.state_path());
        Self {
            ctx,
            source,
            resolver,
            cascade,
            channels,
            store,
        }
    }

    /// Wire up the real network clients from configuration.
    pub fn from_context(ctx: RunContext) -> Self {
        let config = &ctx.config;
        let source = Box::new(TwitClient::new(&config.twit));
        let resolver =
            TranscriptResolver::new(&config.twit.transcript_base, Box::new(HttpFetcher::new()));

        let cascade = if ctx.options.use_ai {
            match llm::from_config(config) {
                Ok(generator) => {
                    log::info!("AI tier enabled with model {}", generator.model());
                    ContentCascade::with_ai(AiStrategy::new(
                        generator,
                        &config.promo.presenter,
                        ctx.options.post_to_microblog,
                    ))
                }
                Err(e) => {
                    log::warn!("AI tier unavailable, using templates: {}", e);
                    ContentCascade::template_only()
                }
            }
        } else {
            ContentCascade::template_only()
        };

        let channels = if ctx.options.dry_run {
            Vec::new()
        } else {
            build_channels(config, &ctx.options)
        };

        Self::new(ctx, source, resolver, cascade, channels)
    }

    /// Run the pipeline once. Only a failure to list episodes, or to write
    /// the promoted set back, is an error.
    pub async fn run(&self) -> Result<RunReport> {
        let options = &self.ctx.options;
        log::info!(
            "Promotion run started (dry_run={}, force={}, cutoff={})",
            options.dry_run,
            options.force,
            self.ctx.age_cutoff().to_rfc3339()
        );

        let mut record = self.store.load();
        let episodes = self.source.recent_episodes(options.episode_count).await?;
        if episodes.is_empty() {
            log::warn!("No episodes returned from the episode source");
        }

        let mut report = RunReport::default();
        // Ids delivered or previewed earlier in this run. Checked even with
        // force, so a repeated listing entry is never delivered twice.
        let mut handled: HashSet<String> = HashSet::new();
        for episode in &episodes {
            let outcome = if handled.contains(&episode.id) {
                log::warn!("Episode {} listed more than once, skipping repeat", episode.id);
                EpisodeOutcome::SkippedAlreadyPromoted
            } else {
                let span =
                    tracing::info_span!("episode", id = %episode.id, show = %episode.show.code);
                self.process(episode, &record).instrument(span).await
            };

            if outcome.marks_promoted() {
                record.insert(&episode.id);
            }
            if matches!(outcome, EpisodeOutcome::Previewed { .. }) || outcome.marks_promoted() {
                handled.insert(episode.id.clone());
            }
            log::info!("{} (episode {}): {}", episode.reference(), episode.id, outcome.label());
            report.episodes.push(EpisodeReport {
                episode_id: episode.id.clone(),
                reference: episode.reference(),
                outcome,
            });
        }

        if !options.dry_run && report.promoted_count() > 0 {
            self.store.save(&mut record, Utc::now())?;
            report.state_saved = true;
        }

        report.log_summary();
        Ok(report)
    }

    fn is_too_old(&self, episode: &Episode) -> bool {
        episode
            .airing_date
            .map_or(false, |aired| aired < self.ctx.age_cutoff())
    }

    async fn process(&self, episode: &Episode, record: &PromotionRecord) -> EpisodeOutcome {
        let options = &self.ctx.options;
        if !options.force && record.contains(&episode.id) {
            return EpisodeOutcome::SkippedAlreadyPromoted;
        }
        if self.is_too_old(episode) {
            return EpisodeOutcome::SkippedTooOld;
        }

        let transcript = self
            .resolver
            .resolve(
                &episode.show.slug,
                &episode.show.label,
                episode.episode_number.as_deref(),
            )
            .await;
        if transcript.transcript.is_none() {
            log::info!(
                "No transcript yet for {}, will retry later (tried {} URLs)",
                episode.reference(),
                transcript.attempted.len()
            );
            return EpisodeOutcome::SkippedNoTranscriptYet;
        }

        let episode_url = episode.episode_url(&self.ctx.config.twit.web_url);
        let promo = self
            .cascade
            .generate(&PromoRequest {
                episode,
                episode_url: &episode_url,
                transcript: &transcript,
            })
            .await;
        let tier = promo.tier();

        if options.dry_run {
            return EpisodeOutcome::Previewed {
                tier,
                text: promo.text,
            };
        }

        if self.channels.is_empty() {
            log::warn!("No delivery channels configured; {} is marked promoted anyway", episode.id);
        }

        let post = OutgoingPost {
            episode,
            promo: &promo,
        };
        let mut failed_channels = Vec::new();
        for channel in &self.channels {
            if !channel.post(&post).await {
                failed_channels.push(channel.name().to_string());
            }
        }

        if failed_channels.is_empty() {
            EpisodeOutcome::Promoted { tier }
        } else {
            log::warn!(
                "Delivery failed on [{}] for {}",
                failed_channels.join(", "),
                episode.reference()
            );
            EpisodeOutcome::PartiallyFailed {
                tier,
                failed_channels,
            }
        }
    }
}
