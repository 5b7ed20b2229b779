//! Outbound channels.
//!
//! Each channel is independent and best-effort: `post` reports success as a
//! bool, logs its own failures and never raises. Length caps are enforced by
//! truncation inside each channel.

pub mod discord;
pub mod discourse;
pub mod mastodon;

use crate::config::{Config, RunOptions};
use crate::error::Result;
use crate::models::Episode;
use crate::promo::Promo;
use async_trait::async_trait;
use std::time::Duration;

pub use discord::DiscordChannel;
pub use discourse::DiscourseChannel;
pub use mastodon::MastodonChannel;

pub(crate) const POST_TIMEOUT: Duration = Duration::from_secs(30);

/// One episode's promo, ready to send.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingPost<'a> {
    pub episode: &'a Episode,
    pub promo: &'a Promo,
}

#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn post(&self, post: &OutgoingPost<'_>) -> bool;
}

/// Cut `text` to at most `cap` characters. Longer text keeps its first
/// `cap - 3` characters followed by `...`.
pub fn truncate_with_ellipsis(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let keep = cap.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn keep_configured<C: Channel + 'static>(
    channels: &mut Vec<Box<dyn Channel>>,
    name: &str,
    built: Result<C>,
) {
    match built {
        Ok(channel) => channels.push(Box::new(channel)),
        Err(e) => log::info!("{} channel disabled: {}", name, e),
    }
}

/// Channels enabled for this run. Channels missing credentials are left out.
pub fn build_channels(config: &Config, options: &RunOptions) -> Vec<Box<dyn Channel>> {
    let mut channels: Vec<Box<dyn Channel>> = Vec::new();
    keep_configured(&mut channels, "Discord", DiscordChannel::new(&config.discord));
    if options.post_to_forum {
        keep_configured(
            &mut channels,
            "Discourse",
            DiscourseChannel::new(&config.discourse),
        );
    }
    if options.post_to_microblog {
        keep_configured(&mut channels, "Mastodon", MastodonChannel::new(&config.mastodon));
    }
    log::info!(
        "Delivery channels: [{}]",
        channels.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    );
    channels
}
