use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Show identity as carried on every episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    /// Last path segment of the show's canonical path, e.g. `this-week-in-tech`.
    pub slug: String,
    /// Display label, e.g. `This Week in Tech`. May contain HTML entities.
    pub label: String,
    /// Short code, e.g. `TWiT` or `SN`. Empty when unknown.
    pub code: String,
}

/// An episode as fetched from the episode source. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub show: Show,
    pub episode_number: Option<String>,
    pub title: String,
    pub airing_date: Option<DateTime<Utc>>,
    pub show_notes: String,
    /// Site-relative canonical path, e.g. `/shows/security-now/episodes/1000`.
    pub clean_path: String,
    pub teaser: Option<String>,
    pub description: Option<String>,
}

impl Episode {
    /// Absolute URL of the episode page.
    pub fn episode_url(&self, web_base: &str) -> String {
        format!("{}{}", web_base.trim_end_matches('/'), self.clean_path)
    }

    /// "Show #123 (CODE)", degrading gracefully when parts are missing.
    pub fn reference(&self) -> String {
        let mut reference = match self.episode_number.as_deref() {
            Some(number) if !number.is_empty() => format!("{} #{}", self.show.label, number),
            _ => self.show.label.clone(),
        };
        if !self.show.code.is_empty() {
            reference = format!("{} ({})", reference, self.show.code);
        }
        reference
    }

    /// Episode number for display, `?` when absent.
    pub fn number_or_placeholder(&self) -> &str {
        match self.episode_number.as_deref() {
            Some(number) if !number.is_empty() => number,
            _ => "?",
        }
    }
}

/// Which content strategy produced a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTier {
    Ai,
    Template,
}

impl std::fmt::Display for GenerationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ai => write!(f, "ai"),
            Self::Template => write!(f, "template"),
        }
    }
}

/// Intermediate content behind a promo post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub summary: String,
    pub topics: Vec<String>,
    pub notable_quote: String,
    pub tier: GenerationTier,
}

impl ContentDraft {
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty() && self.topics.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Upstream ids arrive as either JSON numbers or strings; normalize to text.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|id| match id {
        RawId::Number(n) => Some(n.to_string()),
        RawId::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        RawId::Text(_) => None,
    }))
}

/// Parse an ISO-8601 airing date into UTC.
///
/// Accepts full RFC 3339 timestamps, offset-less timestamps (read as UTC)
/// and bare dates (midnight UTC). Anything else is `None`.
pub fn parse_airing_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
