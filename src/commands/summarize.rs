use crate::api::{EpisodeSource, TwitClient};
use crate::config::Config;
use crate::error::{PromoError, Result};
use crate::llm::{self, Generator};
use crate::models::{ContentDraft, Episode};
use crate::promo::summarizer;
use crate::transcript::{HttpFetcher, TranscriptResolver};

/// Episodes scanned when looking up a specific id.
const LOOKUP_WINDOW: usize = 50;

fn pick_episode(episodes: Vec<Episode>, episode_id: Option<&str>) -> Result<Episode> {
    let found = match episode_id {
        Some(id) => episodes.into_iter().find(|e| e.id == id),
        None => episodes.into_iter().next(),
    };
    found.ok_or_else(|| match episode_id {
        Some(id) => PromoError::Validation(format!("Episode {} not found among recent episodes", id)),
        None => PromoError::Validation("No episodes returned from the episode source".to_string()),
    })
}

pub fn format_draft(draft: &ContentDraft) -> String {
    let mut out = format!("Summary:\n{}\n", draft.summary);
    if !draft.topics.is_empty() {
        out.push_str("\nTopics:\n");
        for topic in &draft.topics {
            out.push_str(&format!("  - {}\n", topic));
        }
    }
    if !draft.notable_quote.is_empty() {
        out.push_str(&format!("\nNotable quote: {}\n", draft.notable_quote));
    }
    out
}

/// Summarize the newest episode, or the given one, from its transcript.
pub async fn summarize(config: Config, episode_id: Option<String>) -> Result<()> {
    log::info!("summarize called for episode {:?}", episode_id);
    let generator = llm::from_config(&config)?;
    let source = TwitClient::new(&config.twit);
    let resolver =
        TranscriptResolver::new(&config.twit.transcript_base, Box::new(HttpFetcher::new()));

    let count = if episode_id.is_some() { LOOKUP_WINDOW } else { 1 };
    let episode = pick_episode(source.recent_episodes(count).await?, episode_id.as_deref())?;

    summarize_episode(&episode, &resolver, generator.as_ref()).await
}

pub async fn summarize_episode(
    episode: &Episode,
    resolver: &TranscriptResolver,
    generator: &dyn Generator,
) -> Result<()> {
    let result = resolver
        .resolve(
            &episode.show.slug,
            &episode.show.label,
            episode.episode_number.as_deref(),
        )
        .await;
    let (url, html) = match &result.transcript {
        Some(t) => (t.url.as_str(), t.html.as_str()),
        None => {
            return Err(PromoError::Validation(format!(
                "No transcript found. Tried: {}",
                result.attempted.join(", ")
            )))
        }
    };

    println!("Summarizing: {} - {}", episode.reference(), episode.title);
    println!("Transcript: {}\n", url);

    let draft = summarizer::summarize(generator, html, episode).await?;
    if draft.is_empty() {
        return Err(PromoError::ContentGeneration(
            "Summarization returned nothing".to_string(),
        ));
    }
    print!("{}", format_draft(&draft));
    Ok(())
}
