use thiserror::Error;

/// Typed error hierarchy for the promotion pipeline.
///
/// Most variants are contained at the episode or channel level and only
/// surface as log lines. The one fatal path is a failure to fetch the
/// episode list, which the binary reports with a non-zero exit.
#[derive(Debug, Error)]
pub enum PromoError {
    /// Any failed external fetch: timeouts, connection errors, non-2xx responses.
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// The AI tier could not produce usable copy.
    #[error("Content generation failed: {0}")]
    ContentGeneration(String),

    /// A fetched document did not pass content validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing credential for an optional integration, or an unreadable config file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unreadable persisted state or cache. Callers treat it as absent.
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, PromoError>;

// ── From impls ─────────────────────────────────────────────────────────────

impl From<reqwest::Error> for PromoError {
    fn from(e: reqwest::Error) -> Self {
        PromoError::TransientNetwork(e.to_string())
    }
}

impl From<std::io::Error> for PromoError {
    fn from(e: std::io::Error) -> Self {
        PromoError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for PromoError {
    fn from(e: serde_json::Error) -> Self {
        PromoError::Json(e.to_string())
    }
}

impl From<serde_yaml::Error> for PromoError {
    fn from(e: serde_yaml::Error) -> Self {
        PromoError::Configuration(e.to_string())
    }
}
