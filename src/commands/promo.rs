use crate::config::{Config, RunContext, RunOptions};
use crate::error::Result;
use crate::worker::{PromotionWorker, RunReport};

/// Switches accepted by `castpromo promo`.
#[derive(Debug, Clone, Default)]
pub struct PromoFlags {
    pub dry_run: bool,
    pub force: bool,
    pub no_ai: bool,
    pub no_discourse: bool,
    pub no_mastodon: bool,
    pub count: Option<usize>,
}

impl PromoFlags {
    pub fn to_options(&self, config: &Config) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            force: self.force,
            use_ai: !self.no_ai,
            post_to_forum: !self.no_discourse,
            post_to_microblog: !self.no_mastodon,
            episode_count: self.count.unwrap_or(config.promo.episode_count).max(1),
        }
    }
}

/// Render dry-run previews the way they are printed.
pub fn format_previews(report: &RunReport) -> String {
    report
        .previews()
        .map(|(reference, text)| format!("--- {} ---\n{}\n", reference, text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate and deliver promos for recent episodes.
pub async fn promo(config: Config, flags: PromoFlags) -> Result<RunReport> {
    log::info!("promo called with flags: {:?}", flags);
    let options = flags.to_options(&config);
    let ctx = RunContext::new(config, options);
    let worker = PromotionWorker::from_context(ctx);

    let report = worker.run().await?;
    if flags.dry_run {
        print!("{}", format_previews(&report));
    }
    Ok(report)
}
