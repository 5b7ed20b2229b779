//! Configuration loading and the per-run context.
//!
//! `config.yaml` supplies everything; credentials can be overlaid from a
//! `.env` file next to it or from the process environment (highest priority).

use crate::error::{PromoError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const STATE_FILE_NAME: &str = "transcript-promo-state.json";
/// Upper bound for `promo.max_episode_age_days` (ten years).
pub const MAX_EPISODE_AGE_DAYS: i64 = 3650;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twit: TwitConfig,
    pub ai: AiConfig,
    pub anthropic: AnthropicConfig,
    pub ollama: OllamaConfig,
    pub discord: DiscordConfig,
    pub discourse: DiscourseConfig,
    pub mastodon: MastodonConfig,
    pub promo: PromoConfig,
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitConfig {
    pub api_url: String,
    pub web_url: String,
    pub transcript_base: String,
    pub app_id: String,
    pub app_key: String,
}

impl Default for TwitConfig {
    fn default() -> Self {
        Self {
            api_url: "https://twit.tv/api/v1.0".to_string(),
            web_url: "https://twit.tv".to_string(),
            transcript_base: "https://twit.tv/posts/transcripts".to_string(),
            app_id: String::new(),
            app_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Anthropic,
    Ollama,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: String::new(),
            model: "claude-haiku-4-5-20251001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscourseConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_username: String,
}

impl Default for DiscourseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://twit.community".to_string(),
            api_key: String::new(),
            api_username: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    pub instance_url: String,
    pub access_token: String,
    pub visibility: String,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            instance_url: String::new(),
            access_token: String::new(),
            visibility: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromoConfig {
    pub max_episode_age_days: i64,
    pub episode_count: usize,
    /// Name the AI writes as.
    pub presenter: String,
}

impl Default for PromoConfig {
    fn default() -> Self {
        Self {
            max_episode_age_days: 14,
            episode_count: 10,
            presenter: "Leo Laporte".to_string(),
        }
    }
}

/// Fail with a configuration error when a required value is blank.
pub fn require<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PromoError::Configuration(format!("{} is not configured", what)))
    } else {
        Ok(trimmed)
    }
}

impl Config {
    /// Load `config.yaml`, then overlay `.env` and process environment values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PromoError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;

        let env_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.apply_env_overlay(|key| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| load_env_value(&env_dir, key))
        });

        log::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Overlay credential values. `lookup` returns `None` for unset keys.
    pub fn apply_env_overlay<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k));

        if let Some(v) = first(&["TWIT_APP_ID"]) {
            self.twit.app_id = v;
        }
        if let Some(v) = first(&["TWIT_APP_KEY"]) {
            self.twit.app_key = v;
        }
        if let Some(v) = first(&["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"]) {
            self.anthropic.api_key = v;
        }
        if let Some(v) = first(&["DISCORD_WEBHOOK_URL"]) {
            self.discord.webhook_url = v;
        }
        if let Some(v) = first(&["DISCOURSE_API_KEY"]) {
            self.discourse.api_key = v;
        }
        if let Some(v) = first(&["DISCOURSE_API_USERNAME"]) {
            self.discourse.api_username = v;
        }
        if let Some(v) = first(&["MASTODON_ACCESS_TOKEN"]) {
            self.mastodon.access_token = v;
        }
        if let Some(v) = first(&["MASTODON_INSTANCE_URL"]) {
            self.mastodon.instance_url = v;
        }
    }

    /// Reject values the run cannot work with.
    pub fn validate(&self) -> Result<()> {
        let days = self.promo.max_episode_age_days;
        if !(1..=MAX_EPISODE_AGE_DAYS).contains(&days) {
            return Err(PromoError::Configuration(format!(
                "promo.max_episode_age_days must be between 1 and {}, got {}",
                MAX_EPISODE_AGE_DAYS, days
            )));
        }
        Ok(())
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("castpromo")
        })
    }
}

/// Load a value from the .env file in `dir` by key name.
pub fn load_env_value(dir: &Path, key: &str) -> Option<String> {
    let env_path = dir.join(".env");
    let prefix = format!("{}=", key);
    let content = std::fs::read_to_string(&env_path).ok()?;
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(&prefix) {
            let value = rest.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Per-invocation switches from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    pub force: bool,
    pub use_ai: bool,
    pub post_to_forum: bool,
    pub post_to_microblog: bool,
    pub episode_count: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            use_ai: true,
            post_to_forum: true,
            post_to_microblog: true,
            episode_count: PromoConfig::default().episode_count,
        }
    }
}

/// Everything a run needs, built once and handed to every component.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    pub options: RunOptions,
    /// Clock reading taken at run start. All age checks use it.
    pub started_at: DateTime<Utc>,
    pub cache_dir: PathBuf,
}

impl RunContext {
    pub fn new(config: Config, options: RunOptions) -> Self {
        Self::at(config, options, Utc::now())
    }

    pub fn at(config: Config, options: RunOptions, started_at: DateTime<Utc>) -> Self {
        let cache_dir = config.resolved_cache_dir();
        Self {
            config,
            options,
            started_at,
            cache_dir,
        }
    }

    /// Episodes that aired strictly before this instant are too old.
    pub fn age_cutoff(&self) -> DateTime<Utc> {
        Duration::try_days(self.config.promo.max_episode_age_days)
            .and_then(|window| self.started_at.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn state_path(&self) -> PathBuf {
        self.cache_dir.join(STATE_FILE_NAME)
    }
}
