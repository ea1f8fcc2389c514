//! Forecast response cache
//!
//! Caches upstream marine forecast payloads keyed by the coordinate pair
//! exactly as received. Keys are never normalized: callers sending
//! `10.0,20.0` and `10.00,20.0` get separate entries.
//!
//! An entry is fresh while `now - fetched_at < window`, strictly. An entry
//! exactly `window` old is stale. Stale and missing entries trigger a
//! fetch; concurrent misses each fetch and the last writer wins. A failed
//! fetch leaves the cache untouched.

use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
struct ForecastEntry {
    payload: Arc<Value>,
    fetched_at: Instant,
}

/// Bounded cache of forecast payloads
#[derive(Clone)]
pub struct ForecastCache {
    entries: Cache<String, ForecastEntry>,
    window: Duration,
}

impl ForecastCache {
    /// Create a cache with the given freshness window and entry bound
    pub fn new(window: Duration, max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
            window,
        }
    }

    /// Return the cached payload for `key` if fresh, otherwise run
    /// `fetch` and store its result.
    ///
    /// A fetch error propagates to the caller; any previously stored
    /// entry stays in place (it is already stale and will not be served).
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value, E>>,
    {
        if let Some(entry) = self.entries.get(key).await {
            if entry.fetched_at.elapsed() < self.window {
                return Ok(entry.payload);
            }
        }

        let payload = Arc::new(fetch().await?);
        self.entries
            .insert(
                key.to_string(),
                ForecastEntry {
                    payload: payload.clone(),
                    fetched_at: Instant::now(),
                },
            )
            .await;

        Ok(payload)
    }

    /// Number of entries currently held (stale included)
    #[cfg(test)]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WINDOW: Duration = Duration::from_secs(300);

    fn cache() -> ForecastCache {
        ForecastCache::new(WINDOW, 100)
    }

    async fn fetch_counted(
        cache: &ForecastCache,
        key: &str,
        calls: &AtomicUsize,
    ) -> Arc<Value> {
        cache
            .get_or_fetch(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(json!({"wave_height": 1.4}))
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_within_window_hits_cache() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        fetch_counted(&cache, "33.5,-117.8", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_window_elapses() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        tokio::time::advance(Duration::from_secs(360)).await;
        fetch_counted(&cache, "33.5,-117.8", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_exactly_window_old_is_stale() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        tokio::time::advance(WINDOW).await;
        fetch_counted(&cache, "33.5,-117.8", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_precision_keys_are_distinct_entries() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        fetch_counted(&cache, "10.0,20.0", &calls).await;
        fetch_counted(&cache, "10.00,20.0", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_propagates_and_cache_untouched() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("33.5,-117.8", || async {
                Err::<Value, _>(anyhow::anyhow!("upstream down"))
            })
            .await;
        assert!(result.is_err());

        // Next call fetches again; nothing was stored
        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_does_not_clobber_stale_entry() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        tokio::time::advance(Duration::from_secs(400)).await;

        // Stale entry; failed refresh propagates the error
        let result = cache
            .get_or_fetch("33.5,-117.8", || async {
                Err::<Value, _>(anyhow::anyhow!("upstream down"))
            })
            .await;
        assert!(result.is_err());

        // A successful refresh replaces the stale entry
        fetch_counted(&cache, "33.5,-117.8", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_payload_is_served_verbatim() {
        let cache = cache();

        let first = cache
            .get_or_fetch("k", || async {
                Ok::<_, anyhow::Error>(json!({"hourly": {"wave_height": [1.0, 1.2]}}))
            })
            .await
            .unwrap();

        let second = cache
            .get_or_fetch("k", || async {
                panic!("should not fetch while fresh");
                #[allow(unreachable_code)]
                Ok::<_, anyhow::Error>(Value::Null)
            })
            .await
            .unwrap();

        assert_eq!(*first, *second);
    }
}
