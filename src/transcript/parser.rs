//! Markup stripping, show-notes list parsing and transcript highlight extraction.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid regex")
});
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid regex"));
static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// `[HH:MM:SS]:` speaker-line marker present on every real transcript page.
pub static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d{2}:\d{2}:\d{2}\]:").expect("valid regex"));

/// The "Coming up on <show>, <teaser>" cold open that most transcripts start with.
static TEASER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Coming up on .*?,\s*(.*?)\s*(?:So tune in|Recorded on|This is)")
        .expect("valid regex")
});

const MIN_HIGHLIGHT_CHARS: usize = 80;
const MIN_HIGHLIGHT_WORDS: usize = 12;

/// Page chrome and navigation text that sometimes leaks into a match.
const JUNK_FRAGMENTS: &[&str] = &[
    "Primary Navigation",
    "Transcript",
    "our leader, Mr.",
    "More\u{2026}.",
];

/// Titles whose period would otherwise look like a sentence end.
const ABBREVIATION_ENDINGS: &[&str] = &["Mr.", "Ms.", "Dr."];

/// Decode the HTML entities that show up in titles, notes and transcripts.
/// Unknown named entities are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(c)
}

/// Strip tags (dropping script and style bodies), decode entities and
/// collapse horizontal whitespace. Line and paragraph breaks become newlines.
pub fn strip_html(markup: &str) -> String {
    let text = SCRIPT_RE.replace_all(markup, " ");
    let text = STYLE_RE.replace_all(&text, " ");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, " ");
    let text = decode_entities(&text);
    HSPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// `<li>` items from show-notes markup, stripped and non-empty.
pub fn extract_list_items(notes_html: &str) -> Vec<String> {
    LIST_ITEM_RE
        .captures_iter(notes_html)
        .map(|caps| collapse_whitespace(&strip_html(&caps[1])))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Lowercase URL slug: entities decoded, non-alphanumeric runs become `-`.
pub fn slugify(text: &str) -> String {
    let lowered = decode_entities(text).to_lowercase();
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Everything from the first timestamp marker on; the full text if none.
fn skip_page_chrome(text: &str) -> &str {
    match TIMESTAMP_RE.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    }
}

/// Pull the cold-open teaser sentence out of a transcript page, if it is
/// long enough to be worth quoting.
pub fn extract_transcript_highlight(transcript_html: &str) -> Option<String> {
    let text = strip_html(transcript_html);
    let body = skip_page_chrome(&text);

    let caps = TEASER_RE.captures(body)?;
    let sentence = collapse_whitespace(&caps[1])
        .trim_matches(|c| c == ' ' || c == '.')
        .to_string();

    if is_good_highlight(&sentence) {
        Some(sentence)
    } else {
        log::debug!("Rejected transcript highlight candidate: {:?}", sentence);
        None
    }
}

pub fn is_good_highlight(text: &str) -> bool {
    let cleaned = collapse_whitespace(text);
    if cleaned.chars().count() < MIN_HIGHLIGHT_CHARS {
        return false;
    }
    if cleaned.split_whitespace().count() < MIN_HIGHLIGHT_WORDS {
        return false;
    }
    if JUNK_FRAGMENTS.iter().any(|frag| cleaned.contains(frag)) {
        return false;
    }
    !ABBREVIATION_ENDINGS.iter().any(|abbr| cleaned.ends_with(abbr))
}
