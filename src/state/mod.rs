pub mod cache;


use crate::error::{PromoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use cache::{CacheEntry, TtlCache};

/// The set of episodes that have already been promoted.
///
/// Grows only. Nothing in the crate removes ids; an operator who wants an
/// episode re-promoted uses `--force` or edits the file by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    #[serde(rename = "posted_episode_ids", default)]
    promoted: BTreeSet<String>,
    #[serde(rename = "updated_at_utc", default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Single-id format written by older releases; folded into `promoted` on load.
    #[serde(
        rename = "last_posted_episode_id",
        default,
        skip_serializing,
        deserialize_with = "crate::models::de_opt_id"
    )]
    legacy_last_posted: Option<String>,
}

impl PromotionRecord {
    pub fn contains(&self, episode_id: &str) -> bool {
        self.promoted.contains(episode_id)
    }

    /// Returns true when the id was not already present.
    pub fn insert(&mut self, episode_id: &str) -> bool {
        self.promoted.insert(episode_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.promoted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.promoted.iter().map(String::as_str)
    }

    fn migrate_legacy(&mut self) {
        if let Some(old) = self.legacy_last_posted.take() {
            if !old.is_empty() {
                self.promoted.insert(old);
            }
        }
    }
}

/// JSON-file persistence for the promotion record.
///
/// Read completely at run start and rewritten completely at run end.
/// Assumes a single writer.
pub struct PromotionStore {
    path: PathBuf,
}

impl PromotionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load. A missing file is an empty record; unreadable content is
    /// `CorruptState`.
    pub fn try_load(&self) -> Result<PromotionRecord> {
        if !self.path.exists() {
            return Ok(PromotionRecord::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PromoError::CorruptState(format!("{}: {}", self.path.display(), e)))?;
        let mut record: PromotionRecord = serde_json::from_str(&content)
            .map_err(|e| PromoError::CorruptState(format!("{}: {}", self.path.display(), e)))?;
        record.migrate_legacy();
        Ok(record)
    }

    /// Lenient load used by the pipeline: corrupt state counts as absent.
    pub fn load(&self) -> PromotionRecord {
        match self.try_load() {
            Ok(record) => {
                log::info!(
                    "Loaded promotion state: {} episodes already promoted",
                    record.len()
                );
                record
            }
            Err(e) => {
                log::warn!("Ignoring unreadable promotion state: {}", e);
                PromotionRecord::default()
            }
        }
    }

    /// Stamp and rewrite the whole record.
    pub fn save(&self, record: &mut PromotionRecord, now: DateTime<Utc>) -> Result<()> {
        record.updated_at = Some(now);
        write_json_atomically(&self.path, record)?;
        log::info!(
            "Saved promotion state ({} episodes) to {}",
            record.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over the target.
pub(crate) fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
