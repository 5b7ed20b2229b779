//! Deterministic promo copy built from episode metadata alone.

use super::voices::voice_for;
use crate::models::{ContentDraft, Episode, GenerationTier};
use crate::transcript::parser::{
    collapse_whitespace, extract_list_items, extract_transcript_highlight, strip_html,
};

pub const MAX_BULLETS: usize = 3;
const GENERIC_BULLET: &str = "Sharp analysis and standout insights from the TWiT network.";
const ENJOY_LINE: &str = "I think you'll really enjoy this one.";

/// Inputs the template needs besides the episode itself.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    pub episode: &'a Episode,
    pub episode_url: &'a str,
    pub transcript_url: Option<&'a str>,
    pub transcript_html: Option<&'a str>,
}

/// Normalize to one trailing period and append unless full or duplicate.
fn push_unique(bullets: &mut Vec<String>, candidate: &str) {
    let collapsed = collapse_whitespace(candidate);
    let body = collapsed.trim_end_matches('.').trim_end();
    if body.is_empty() || bullets.len() >= MAX_BULLETS {
        return;
    }
    let bullet = format!("{}.", body);
    if !bullets.contains(&bullet) {
        bullets.push(bullet);
    }
}

/// Up to three bullets: the transcript highlight, then show-notes items,
/// then teaser, description and a generic line as filler.
pub fn collect_bullets(episode: &Episode, transcript_html: Option<&str>) -> Vec<String> {
    let mut bullets = Vec::with_capacity(MAX_BULLETS);

    if let Some(highlight) = transcript_html.and_then(extract_transcript_highlight) {
        push_unique(&mut bullets, &highlight);
    }
    for item in extract_list_items(&episode.show_notes) {
        push_unique(&mut bullets, &item);
    }

    let fallbacks = [episode.teaser.as_deref(), episode.description.as_deref()];
    for fallback in fallbacks.into_iter().flatten() {
        push_unique(&mut bullets, &strip_html(fallback));
    }
    push_unique(&mut bullets, GENERIC_BULLET);

    bullets
}

fn published(episode: &Episode) -> String {
    match episode.airing_date {
        Some(date) => date.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// Render the full post text.
pub fn build_template_promo(input: &TemplateInput<'_>) -> String {
    let episode = input.episode;
    let voice = voice_for(&episode.show.code);
    let bullets = collect_bullets(episode, input.transcript_html);
    let title = episode.title.trim().trim_end_matches('.');

    let mut lines: Vec<String> = vec![
        format!("{} {} — \"{}.\"", voice.lead, episode.reference(), title),
        String::new(),
        voice.section.to_string(),
    ];
    lines.extend(bullets.iter().map(|b| format!("- {}", b)));
    lines.push(String::new());
    lines.push(ENJOY_LINE.to_string());
    lines.push(format!("Listen/watch: {}", input.episode_url));
    if let Some(url) = input.transcript_url {
        lines.push(format!("Transcript: {}", url));
    }
    lines.push(format!("Published: {}", published(episode)));
    lines.push(String::new());
    lines.push(voice.close.to_string());
    lines.push(String::new());
    lines.push(voice.tags.to_string());

    lines.join("\n")
}

/// The draft behind a template promo: bullets become topics, the highlight
/// (when there is one) becomes the quote.
pub fn template_draft(input: &TemplateInput<'_>) -> ContentDraft {
    let topics = collect_bullets(input.episode, input.transcript_html);
    ContentDraft {
        summary: topics.first().cloned().unwrap_or_default(),
        notable_quote: input
            .transcript_html
            .and_then(extract_transcript_highlight)
            .unwrap_or_default(),
        topics,
        tier: GenerationTier::Template,
    }
}
