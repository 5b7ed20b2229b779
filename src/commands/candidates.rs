use crate::config::Config;
use crate::error::Result;
use crate::transcript::{HttpFetcher, TranscriptResolver};

/// Print the transcript URLs that would be probed for an episode, and with
/// `probe` set, whether each one currently validates.
pub async fn candidates(
    config: Config,
    show_slug: &str,
    show_label: &str,
    episode_number: &str,
    probe: bool,
) -> Result<()> {
    log::info!(
        "candidates called for {} / {} #{}",
        show_slug,
        show_label,
        episode_number
    );
    let resolver =
        TranscriptResolver::new(&config.twit.transcript_base, Box::new(HttpFetcher::new()));
    let urls = resolver.candidate_urls(show_slug, show_label, Some(episode_number));
    if urls.is_empty() {
        log::warn!("No candidates: an episode number is required");
    }

    for url in urls {
        if probe {
            let status = if resolver.probe(&url).await.is_some() {
                "found"
            } else {
                "missing"
            };
            println!("{:<8} {}", status, url);
        } else {
            println!("{}", url);
        }
    }
    Ok(())
}
