//! Time-bounded JSON file cache keyed by data-source name.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Fresh while strictly younger than `max_age`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < max_age
    }
}

pub struct TtlCache {
    dir: PathBuf,
}

impl TtlCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Bytes outside `[A-Za-z0-9_-]` (including `%`) are written as `%XX`,
    /// so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut safe = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                safe.push(byte as char);
            } else {
                safe.push_str(&format!("%{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.json", safe))
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        self.read_at(key, max_age, Utc::now())
    }

    /// Cached payload for `key` if present, readable and fresh at `now`.
    /// Corrupt files are a miss, never an error.
    pub fn read_at<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let path = self.path_for(key);
        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Corrupt cache {}, ignoring: {}", path.display(), e);
                return None;
            }
        };

        if !entry.is_fresh(max_age, now) {
            log::debug!("Cache {} is stale", key);
            return None;
        }

        let age_hours = (now - entry.fetched_at).num_minutes() as f64 / 60.0;
        log::info!("Using cache {} ({:.1}h old)", key, age_hours);
        Some(entry.payload)
    }

    pub fn write<T: Serialize>(&self, key: &str, payload: &T) -> Result<()> {
        self.write_at(key, payload, Utc::now())
    }

    pub fn write_at<T: Serialize>(&self, key: &str, payload: &T, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            payload,
            fetched_at: now,
        };
        super::write_json_atomically(&self.path_for(key), &entry)
    }
}
