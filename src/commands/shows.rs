use crate::api::{ShowListing, TwitClient};
use crate::config::Config;
use crate::error::{PromoError, Result};
use crate::state::TtlCache;
use chrono::Duration;
use std::future::Future;

const SHOWS_CACHE_KEY: &str = "twit_shows";

fn shows_ttl() -> Duration {
    Duration::hours(24)
}

/// Cached listing when fresh, otherwise `fetch` and refresh the cache.
/// A failed cache write only costs a warning.
pub async fn load_shows<F, Fut>(cache: &TtlCache, refresh: bool, fetch: F) -> Result<Vec<ShowListing>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<ShowListing>>>,
{
    if !refresh {
        if let Some(cached) = cache.read::<Vec<ShowListing>>(SHOWS_CACHE_KEY, shows_ttl()) {
            return Ok(cached);
        }
    }

    let shows = fetch().await?;
    if let Err(e) = cache.write(SHOWS_CACHE_KEY, &shows) {
        log::warn!("Failed to cache show list: {}", e);
    }
    Ok(shows)
}

pub fn format_shows(shows: &[ShowListing]) -> String {
    let mut out = format!("{:>6}  {:<12}  {}\n", "ID", "Code", "Label");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for show in shows {
        out.push_str(&format!("{:>6}  {:<12}  {}\n", show.id, show.short_code, show.label));
    }
    out
}

/// List active shows.
pub async fn shows(config: Config, refresh: bool) -> Result<()> {
    log::info!("shows called (refresh={})", refresh);
    let cache = TtlCache::new(config.resolved_cache_dir());
    let client = TwitClient::new(&config.twit);

    let shows = load_shows(&cache, refresh, || client.shows()).await?;
    if shows.is_empty() {
        return Err(PromoError::Validation("No active shows returned".to_string()));
    }
    print!("{}", format_shows(&shows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn listing(id: &str, code: &str, label: &str) -> ShowListing {
        ShowListing {
            id: id.to_string(),
            label: label.to_string(),
            short_code: code.to_string(),
            slug: String::new(),
            clean_path: String::new(),
        }
    }

    #[tokio::test]
    async fn test_second_load_served_from_cache() {
        let temp = TempDir::new().unwrap();
        let cache = TtlCache::new(temp.path());

        let first = load_shows(&cache, false, || async { Ok(vec![listing("1", "SN", "Security Now")]) })
            .await
            .unwrap();
        let second = load_shows(&cache, false, || async {
            Err(PromoError::TransientNetwork("should not be called".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let temp = TempDir::new().unwrap();
        let cache = TtlCache::new(temp.path());
        cache.write(SHOWS_CACHE_KEY, &vec![listing("1", "SN", "Security Now")]).unwrap();

        let shows = load_shows(&cache, true, || async { Ok(vec![listing("2", "WW", "Windows Weekly")]) })
            .await
            .unwrap();

        assert_eq!(shows[0].id, "2");
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_on_miss() {
        let temp = TempDir::new().unwrap();
        let cache = TtlCache::new(temp.path());
        let result = load_shows(&cache, false, || async {
            Err(PromoError::TransientNetwork("down".to_string()))
        })
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_format_shows() {
        let out = format_shows(&[listing("16", "SN", "Security Now")]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "    ID  Code          Label");
        assert_eq!(lines[2], "    16  SN            Security Now");
    }
}
