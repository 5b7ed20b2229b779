// Pipeline tests for the promotion worker.
// Run with: cargo test --lib worker::tests

#[cfg(test)]
mod pipeline_tests {
    use crate::config::{Config, RunContext, RunOptions};
    use crate::delivery::Channel;
    use crate::models::{Episode, GenerationTier, Show};
    use crate::promo::{AiStrategy, ContentCascade};
    use crate::state::{PromotionRecord, PromotionStore};
    use crate::testing::{transcript_page, FakeFetcher, FakeGenerator, FakeSource, RecordingChannel};
    use crate::transcript::TranscriptResolver;
    use crate::worker::{EpisodeOutcome, PromotionWorker};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    const TRANSCRIPTS: &str = "https://twit.tv/posts/transcripts";

    fn run_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    /// This Week in Tech #1071, whose slug yields three transcript candidates.
    fn twit_episode(id: &str, aired: Option<DateTime<Utc>>) -> Episode {
        Episode {
            id: id.to_string(),
            show: Show {
                slug: "this-week-in-tech".to_string(),
                label: "This Week in Tech".to_string(),
                code: "TWiT".to_string(),
            },
            episode_number: Some("1071".to_string()),
            title: "Quantum Leaps".to_string(),
            airing_date: aired,
            show_notes: "<ul><li>Chips</li><li>Courts</li></ul>".to_string(),
            clean_path: "/shows/this-week-in-tech/episodes/1071".to_string(),
            teaser: None,
            description: None,
        }
    }

    fn second_candidate() -> String {
        format!("{}/week-in-tech-1071-transcript", TRANSCRIPTS)
    }

    struct Harness {
        temp: TempDir,
        fetcher: FakeFetcher,
        discord: RecordingChannel,
        forum: RecordingChannel,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
                fetcher: FakeFetcher::new(),
                discord: RecordingChannel::succeeding("discord"),
                forum: RecordingChannel::succeeding("discourse"),
            }
        }

        fn context(&self, options: RunOptions) -> RunContext {
            let config = Config {
                cache_dir: Some(self.temp.path().to_path_buf()),
                ..Config::default()
            };
            RunContext::at(config, options, run_start())
        }

        fn template_options() -> RunOptions {
            RunOptions {
                use_ai: false,
                ..RunOptions::default()
            }
        }

        fn worker_with(
            &self,
            episodes: Vec<Episode>,
            options: RunOptions,
            cascade: ContentCascade,
            channels: Vec<Box<dyn Channel>>,
        ) -> PromotionWorker {
            PromotionWorker::new(
                self.context(options),
                Box::new(FakeSource::with(episodes)),
                TranscriptResolver::new(TRANSCRIPTS, Box::new(self.fetcher.clone())),
                cascade,
                channels,
            )
        }

        fn worker(&self, episodes: Vec<Episode>, options: RunOptions) -> PromotionWorker {
            self.worker_with(
                episodes,
                options,
                ContentCascade::template_only(),
                vec![Box::new(self.discord.clone()), Box::new(self.forum.clone())],
            )
        }

        fn store(&self) -> PromotionStore {
            PromotionStore::new(self.context(RunOptions::default()).state_path())
        }

        fn seed_state(&self, ids: &[&str]) {
            let mut record = PromotionRecord::default();
            for id in ids {
                record.insert(id);
            }
            self.store()
                .save(&mut record, run_start() - Duration::days(1))
                .unwrap();
        }
    }

    // =========================================================================
    // End-to-end scenarios
    // =========================================================================

    #[tokio::test]
    async fn test_new_episode_is_promoted_with_template() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let episode = twit_episode("500", Some(run_start() - Duration::days(3)));

        let report = h
            .worker(vec![episode], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert_eq!(
            report.outcome_for("500"),
            Some(&EpisodeOutcome::Promoted {
                tier: GenerationTier::Template
            })
        );
        assert_eq!(h.fetcher.calls().len(), 2);

        let posts = h.discord.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "500");
        assert!(posts[0]
            .1
            .contains("Listen/watch: https://twit.tv/shows/this-week-in-tech/episodes/1071"));
        assert!(posts[0].1.contains(&format!("Transcript: {}", second_candidate())));
        assert_eq!(h.forum.posts().len(), 1);

        assert!(report.state_saved);
        assert!(h.store().load().contains("500"));
    }

    #[tokio::test]
    async fn test_already_promoted_episode_is_left_alone() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        h.seed_state(&["500"]);
        let state_path = h.store().path().to_path_buf();
        let before = std::fs::read(&state_path).unwrap();

        let episode = twit_episode("500", Some(run_start() - Duration::days(3)));
        let report = h
            .worker(vec![episode], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert_eq!(
            report.outcome_for("500"),
            Some(&EpisodeOutcome::SkippedAlreadyPromoted)
        );
        assert!(h.discord.posts().is_empty());
        assert!(h.forum.posts().is_empty());
        assert!(h.fetcher.calls().is_empty());
        assert!(!report.state_saved);
        assert_eq!(std::fs::read(&state_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_old_episode_skipped_before_resolution() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let episode = twit_episode("501", Some(run_start() - Duration::days(20)));

        let report = h
            .worker(vec![episode], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert_eq!(report.outcome_for("501"), Some(&EpisodeOutcome::SkippedTooOld));
        assert!(h.fetcher.calls().is_empty());
        assert!(h.discord.posts().is_empty());
        assert!(!h.store().path().exists());
    }

    // =========================================================================
    // Age cutoff
    // =========================================================================

    #[tokio::test]
    async fn test_cutoff_boundary() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let cutoff = run_start() - Duration::days(14);
        let episodes = vec![
            twit_episode("at", Some(cutoff)),
            twit_episode("before", Some(cutoff - Duration::seconds(1))),
        ];

        let report = h
            .worker(episodes, Harness::template_options())
            .run()
            .await
            .unwrap();

        assert!(report.outcome_for("at").unwrap().marks_promoted());
        assert_eq!(report.outcome_for("before"), Some(&EpisodeOutcome::SkippedTooOld));
    }

    #[tokio::test]
    async fn test_missing_airing_date_is_not_age_filtered() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());

        let report = h
            .worker(vec![twit_episode("undated", None)], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert!(report.outcome_for("undated").unwrap().marks_promoted());
    }

    // =========================================================================
    // Transcript and delivery outcomes
    // =========================================================================

    #[tokio::test]
    async fn test_no_transcript_means_no_state_change() {
        let h = Harness::new();
        let episode = twit_episode("502", Some(run_start() - Duration::days(1)));

        let report = h
            .worker(vec![episode], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert_eq!(
            report.outcome_for("502"),
            Some(&EpisodeOutcome::SkippedNoTranscriptYet)
        );
        assert_eq!(h.fetcher.calls().len(), 3);
        assert!(h.discord.posts().is_empty());
        assert!(!h.store().path().exists());
    }

    #[tokio::test]
    async fn test_channel_failure_still_marks_promoted() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let broken = RecordingChannel::failing("mastodon");
        let worker = h.worker_with(
            vec![twit_episode("503", Some(run_start() - Duration::days(2)))],
            Harness::template_options(),
            ContentCascade::template_only(),
            vec![Box::new(h.discord.clone()), Box::new(broken.clone())],
        );

        let report = worker.run().await.unwrap();

        assert_eq!(
            report.outcome_for("503"),
            Some(&EpisodeOutcome::PartiallyFailed {
                tier: GenerationTier::Template,
                failed_channels: vec!["mastodon".to_string()],
            })
        );
        assert_eq!(h.discord.posts().len(), 1);
        assert_eq!(broken.posts().len(), 1);
        assert!(h.store().load().contains("503"));
    }

    #[tokio::test]
    async fn test_dry_run_previews_without_side_effects() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let options = RunOptions {
            dry_run: true,
            ..Harness::template_options()
        };

        let report = h
            .worker(vec![twit_episode("504", Some(run_start()))], options)
            .run()
            .await
            .unwrap();

        match report.outcome_for("504") {
            Some(EpisodeOutcome::Previewed { text, .. }) => assert!(text.contains("Quantum Leaps")),
            other => panic!("expected preview, got {:?}", other),
        }
        assert_eq!(report.previews().count(), 1);
        assert!(h.discord.posts().is_empty());
        assert!(!report.state_saved);
        assert!(!h.store().path().exists());
    }

    #[tokio::test]
    async fn test_force_redelivers_promoted_episode() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        h.seed_state(&["500", "400"]);
        let options = RunOptions {
            force: true,
            ..Harness::template_options()
        };

        let report = h
            .worker(vec![twit_episode("500", Some(run_start()))], options)
            .run()
            .await
            .unwrap();

        assert!(report.outcome_for("500").unwrap().marks_promoted());
        assert_eq!(h.discord.posts().len(), 1);
        let record = h.store().load();
        assert_eq!(record.ids().collect::<Vec<_>>(), vec!["400", "500"]);
    }

    #[tokio::test]
    async fn test_force_delivers_repeated_listing_entry_once() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let episode = twit_episode("510", Some(run_start()));
        let options = RunOptions {
            force: true,
            ..Harness::template_options()
        };

        let report = h
            .worker(vec![episode.clone(), episode], options)
            .run()
            .await
            .unwrap();

        assert_eq!(h.discord.posts().len(), 1);
        assert_eq!(h.forum.posts().len(), 1);
        assert_eq!(report.promoted_count(), 1);
        assert_eq!(
            report.episodes[1].outcome,
            EpisodeOutcome::SkippedAlreadyPromoted
        );
    }

    #[tokio::test]
    async fn test_second_run_does_not_redeliver() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let episodes = vec![twit_episode("505", Some(run_start()))];

        h.worker(episodes.clone(), Harness::template_options())
            .run()
            .await
            .unwrap();
        let report = h
            .worker(episodes, Harness::template_options())
            .run()
            .await
            .unwrap();

        assert_eq!(h.discord.posts().len(), 1);
        assert_eq!(report.promoted_count(), 0);
        assert_eq!(
            report.outcome_for("505"),
            Some(&EpisodeOutcome::SkippedAlreadyPromoted)
        );
    }

    #[tokio::test]
    async fn test_ai_tier_output_is_delivered() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        let generator = FakeGenerator::replying(&[
            r#"{"summary": "Chips and courts.", "topics": ["Chips", "Courts", "Cars"], "notable_quote": ""}"#,
            "Leo here: new TWiT is up!",
        ]);
        let worker = h.worker_with(
            vec![twit_episode("506", Some(run_start()))],
            RunOptions::default(),
            ContentCascade::with_ai(AiStrategy::new(Box::new(generator), "Leo Laporte", false)),
            vec![Box::new(h.discord.clone())],
        );

        let report = worker.run().await.unwrap();

        assert_eq!(
            report.outcome_for("506"),
            Some(&EpisodeOutcome::Promoted {
                tier: GenerationTier::Ai
            })
        );
        assert_eq!(h.discord.posts()[0].1, "Leo here: new TWiT is up!");
    }

    #[tokio::test]
    async fn test_unreachable_source_is_fatal() {
        let h = Harness::new();
        let worker = PromotionWorker::new(
            h.context(Harness::template_options()),
            Box::new(FakeSource::unreachable()),
            TranscriptResolver::new(TRANSCRIPTS, Box::new(h.fetcher.clone())),
            ContentCascade::template_only(),
            vec![Box::new(h.discord.clone())],
        );

        assert!(worker.run().await.is_err());
        assert!(!h.store().path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_treated_as_empty() {
        let h = Harness::new();
        h.fetcher.respond(&second_candidate(), transcript_page());
        std::fs::write(h.store().path(), "{ not json").unwrap();

        let report = h
            .worker(vec![twit_episode("507", Some(run_start()))], Harness::template_options())
            .run()
            .await
            .unwrap();

        assert!(report.outcome_for("507").unwrap().marks_promoted());
        assert!(h.store().load().contains("507"));
    }
}
