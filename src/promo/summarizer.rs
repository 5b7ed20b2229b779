//! AI tier: transcript summarization, promo composition and the microblog
//! condensation pass.

use super::voices::VoiceProfile;
use crate::error::{PromoError, Result};
use crate::llm::{extract_json_from_response, CompletionRequest, Generator};
use crate::models::{ContentDraft, Episode, GenerationTier};
use crate::transcript::parser::strip_html;

/// Characters of transcript text sent for summarization.
pub const MAX_TRANSCRIPT_CHARS: usize = 30_000;
const MAX_TOPICS: usize = 5;
pub const MICROBLOG_LIMIT: usize = 500;

const SUMMARY_MAX_TOKENS: u32 = 1024;
const COMPOSE_MAX_TOKENS: u32 = 1024;
const CONDENSE_MAX_TOKENS: u32 = 512;

const SUMMARIZE_SYSTEM: &str = r#"You summarize podcast episode transcripts from the TWiT network.
Reply with one JSON object with exactly these keys:
"summary": a 3-5 sentence summary of the episode,
"topics": an array of 3-5 short topic strings,
"notable_quote": one memorable quote with the speaker's name.
Reply with the JSON only. No markdown fences, no commentary."#;

const CONDENSE_SYSTEM: &str = "Shorten this promotional post so the whole thing, URL and hashtags included, \
fits in 500 characters. Keep the tone casual. Use at most 3 emoji bullet points. \
Keep the episode URL and the hashtags. Reply with the shortened post only.";

/// Truncate on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

const SUMMARY_KEYS: &[&str] = &["summary", "topics", "notable_quote"];

/// Read a summarization reply. Anything that is not a JSON object carrying at
/// least one summary key becomes the summary verbatim, with no topics and no
/// quote.
pub fn parse_summary(raw: &str) -> ContentDraft {
    let parsed = extract_json_from_response(raw).filter(|v| {
        v.as_object()
            .map_or(false, |obj| SUMMARY_KEYS.iter().any(|k| obj.contains_key(*k)))
    });

    let Some(json) = parsed else {
        log::warn!("Summary reply was not structured JSON, using it as plain text");
        return ContentDraft {
            summary: raw.trim().to_string(),
            topics: Vec::new(),
            notable_quote: String::new(),
            tier: GenerationTier::Ai,
        };
    };

    let topics = match json.get("topics") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(value_to_text)
            .filter(|t| !t.is_empty())
            .take(MAX_TOPICS)
            .collect(),
        Some(serde_json::Value::String(single)) if !single.trim().is_empty() => {
            vec![single.trim().to_string()]
        }
        _ => Vec::new(),
    };

    ContentDraft {
        summary: json.get("summary").map(value_to_text).unwrap_or_default(),
        topics,
        notable_quote: json.get("notable_quote").map(value_to_text).unwrap_or_default(),
        tier: GenerationTier::Ai,
    }
}

/// Summarize a transcript page. Generation failures are errors; a reply that
/// cannot be parsed is not.
pub async fn summarize(
    generator: &dyn Generator,
    transcript_html: &str,
    episode: &Episode,
) -> Result<ContentDraft> {
    let text = strip_html(transcript_html);
    let text = truncate_chars(&text, MAX_TRANSCRIPT_CHARS);

    let request = CompletionRequest {
        system: SUMMARIZE_SYSTEM.to_string(),
        user: format!(
            "Summarize this transcript of {} #{} - \"{}\":\n\n{}",
            episode.show.label,
            episode.number_or_placeholder(),
            episode.title,
            text
        ),
        max_tokens: SUMMARY_MAX_TOKENS,
    };

    log::info!(
        "Summarizing {} ({} transcript chars) with {}",
        episode.reference(),
        text.chars().count(),
        generator.model()
    );
    let raw = generator.complete(&request).await?;
    Ok(parse_summary(&raw))
}

fn compose_system_prompt(
    draft: &ContentDraft,
    voice: &VoiceProfile,
    episode: &Episode,
    episode_url: &str,
    presenter: &str,
) -> String {
    let topics = if draft.topics.is_empty() {
        "various tech topics".to_string()
    } else {
        draft.topics.join(", ")
    };

    format!(
        "Write a casual, conversational post as {presenter} for {show} #{number} - \"{title}\".\n\
         Voice and tone: {voice}\n\
         Episode summary: {summary}\n\
         Other topics covered: {topics}\n\n\
         Layout:\n\
         - One short first-person intro sentence, friendly and not salesy\n\
         - 3-5 emoji bullet points, one punchy line each\n\
         - One short closing line inviting discussion\n\
         - The episode URL on its own line\n\
         - Hashtags on the last line\n\n\
         Stay under 150 words and sound like someone sharing a show they enjoyed.\n\
         Episode URL: {url}",
        presenter = presenter,
        show = episode.show.label,
        number = episode.number_or_placeholder(),
        title = episode.title,
        voice = voice.describe(),
        summary = draft.summary,
        topics = topics,
        url = episode_url,
    )
}

/// Turn a draft into finished promo copy in the show's voice.
pub async fn compose(
    generator: &dyn Generator,
    draft: &ContentDraft,
    voice: &VoiceProfile,
    episode: &Episode,
    episode_url: &str,
    presenter: &str,
) -> Result<String> {
    let request = CompletionRequest {
        system: compose_system_prompt(draft, voice, episode, episode_url, presenter),
        user: "Write the promotional post now.".to_string(),
        max_tokens: COMPOSE_MAX_TOKENS,
    };
    let text = generator.complete(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(PromoError::ContentGeneration(
            "composed promo is empty".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Second pass that rewrites a promo for the microblog length limit. Text
/// that already fits is returned unchanged without a generator call.
pub async fn condense_for_microblog(generator: &dyn Generator, promo_text: &str) -> Result<String> {
    if promo_text.chars().count() <= MICROBLOG_LIMIT {
        return Ok(promo_text.to_string());
    }
    let request = CompletionRequest {
        system: CONDENSE_SYSTEM.to_string(),
        user: promo_text.to_string(),
        max_tokens: CONDENSE_MAX_TOKENS,
    };
    let text = generator.complete(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(PromoError::ContentGeneration(
            "condensed promo is empty".to_string(),
        ));
    }
    Ok(text.to_string())
}
