use std::{any::Any, collections::HashMap, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

use crate::{Fetch, FetchError, client::fetch_as};

type Shared = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Outcomes younger than this are served without a request.
    pub dedupe_interval: Duration,
    /// Least recently used keys are evicted past this many entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dedupe_interval: Duration::from_secs(2),
            max_entries: 256,
        }
    }
}

#[derive(Default)]
struct Slot {
    value: Option<Shared>,
    error: Option<FetchError>,
    fetched_at: Option<Instant>,
}

struct Entry {
    // Held for the whole round trip; concurrent callers of a key queue here.
    slot: Arc<Mutex<Slot>>,
    latest: Option<Shared>,
    touched: Instant,
}

/// Stale-while-revalidate store keyed by request path.
///
/// Clones share the same entries, so hand one clone to every accessor that
/// should see the same data.
pub struct SwrCache<F> {
    fetcher: Arc<F>,
    config: CacheConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl<F> Clone for SwrCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            config: self.config,
            entries: Arc::clone(&self.entries),
        }
    }
}

fn downcast<T: Send + Sync + 'static>(key: &str, value: Shared) -> Result<Arc<T>, FetchError> {
    value.downcast::<T>().map_err(|_| FetchError {
        key: key.to_string(),
        message: "cached value has a different type".to_string(),
    })
}

impl<F: Fetch> SwrCache<F> {
    pub fn new(fetcher: F, config: CacheConfig) -> Self {
        Self::with_fetcher(Arc::new(fetcher), config)
    }

    pub fn with_fetcher(fetcher: Arc<F>, config: CacheConfig) -> Self {
        Self {
            fetcher,
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    async fn slot(&self, key: &str) -> Arc<Mutex<Slot>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if let Some(entry) = entries.get_mut(key) {
            entry.touched = now;
            return Arc::clone(&entry.slot);
        }

        if entries.len() >= self.config.max_entries {
            // Slots held by a caller are in flight; evicting one would let the
            // next caller for that key start a second request.
            let oldest = entries
                .iter()
                .filter(|(_, e)| Arc::strong_count(&e.slot) == 1)
                .min_by_key(|(_, e)| e.touched)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(key = %oldest, "evicting");
                entries.remove(&oldest);
            }
        }

        let slot = Arc::new(Mutex::new(Slot::default()));
        entries.insert(
            key.to_string(),
            Entry {
                slot: Arc::clone(&slot),
                latest: None,
                touched: now,
            },
        );
        slot
    }

    /// Value for `key`, fetched at most once per dedupe interval.
    pub async fn get<T>(&self, key: &str) -> Result<Arc<T>, FetchError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let slot = self.slot(key).await;
        let mut slot = slot.lock().await;

        if let Some(at) = slot.fetched_at
            && at.elapsed() < self.config.dedupe_interval
        {
            if let Some(err) = &slot.error {
                debug!(key, "cache hit (error)");
                return Err(err.clone());
            }
            if let Some(value) = &slot.value {
                debug!(key, "cache hit");
                return downcast(key, Arc::clone(value));
            }
        }

        debug!(key, "cache miss");
        match fetch_as::<T, F>(&self.fetcher, key).await {
            Ok(value) => {
                let value = Arc::new(value);
                let shared: Shared = value.clone();

                slot.value = Some(Arc::clone(&shared));
                slot.error = None;
                slot.fetched_at = Some(Instant::now());

                if let Some(entry) = self.entries.lock().await.get_mut(key) {
                    entry.latest = Some(shared);
                }

                info!(key, "fetched");
                Ok(value)
            }
            Err(e) => {
                warn!(key, error = %e, "fetch failed");
                slot.error = Some(e.clone());
                slot.fetched_at = Some(Instant::now());
                Err(e)
            }
        }
    }

    /// Last good value for `key` without touching the network, even while a
    /// revalidation is in flight.
    pub async fn peek<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let entries = self.entries.lock().await;
        let value = entries.get(key)?.latest.clone()?;
        value.downcast::<T>().ok()
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetch;
    use serde_json::json;

    fn cache(fetch: &MockFetch, config: CacheConfig) -> SwrCache<MockFetch> {
        SwrCache::new(fetch.clone(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn dedupes_within_interval_and_revalidates_after() {
        let fetch = MockFetch::new().with("/a", json!([1, 2, 3]));
        let cache = cache(&fetch, CacheConfig::default());

        let first = cache.get::<Vec<u32>>("/a").await.unwrap();
        let second = cache.get::<Vec<u32>>("/a").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetch.count("/a"), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        cache.get::<Vec<u32>>("/a").await.unwrap();
        assert_eq!(fetch.count("/a"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_request() {
        let fetch = MockFetch::new().with_delay("/slow", json!("v"), Duration::from_millis(500));
        let cache = cache(&fetch, CacheConfig::default());

        let (a, b) = tokio::join!(cache.get::<String>("/slow"), cache.get::<String>("/slow"));

        assert_eq!(*a.unwrap(), "v");
        assert_eq!(*b.unwrap(), "v");
        assert_eq!(fetch.count("/slow"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_cached_then_retried() {
        let fetch = MockFetch::new().failing("/bad", "502 Bad Gateway");
        let cache = cache(&fetch, CacheConfig::default());

        let err = cache.get::<String>("/bad").await.unwrap_err();
        assert_eq!(err.key, "/bad");
        assert!(err.message.contains("502"));
        assert!(cache.get::<String>("/bad").await.is_err());
        assert_eq!(fetch.count("/bad"), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(cache.get::<String>("/bad").await.is_err());
        assert_eq!(fetch.count("/bad"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_body_is_a_fetch_error() {
        let fetch = MockFetch::new().with("/shape", json!({ "unexpected": true }));
        let cache = cache(&fetch, CacheConfig::default());

        let err = cache.get::<Vec<u32>>("/shape").await.unwrap_err();
        assert!(err.message.contains("unexpected response shape"));
    }

    #[tokio::test(start_paused = true)]
    async fn peek_returns_last_good_value_only() {
        let fetch = MockFetch::new().with("/a", json!(7));
        let cache = cache(&fetch, CacheConfig::default());

        assert!(cache.peek::<u32>("/a").await.is_none());
        cache.get::<u32>("/a").await.unwrap();
        assert_eq!(cache.peek::<u32>("/a").await.as_deref(), Some(&7));
        assert_eq!(fetch.count("/a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_least_recently_used() {
        let fetch = MockFetch::new()
            .with("/a", json!(1))
            .with("/b", json!(2))
            .with("/c", json!(3));
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let cache = cache(&fetch, config);

        cache.get::<u32>("/a").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.get::<u32>("/b").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.get::<u32>("/a").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.get::<u32>("/c").await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.peek::<u32>("/a").await.is_some());
        assert!(cache.peek::<u32>("/b").await.is_none());

        assert!(cache.invalidate("/a").await);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn eviction_skips_keys_with_requests_in_flight() {
        let fetch = MockFetch::new()
            .with_delay("/a", json!(1), Duration::from_millis(500))
            .with("/b", json!(2));
        let config = CacheConfig {
            max_entries: 1,
            ..CacheConfig::default()
        };
        let cache = cache(&fetch, config);

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get::<u32>("/a").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        cache.get::<u32>("/b").await.unwrap();
        let again = cache.get::<u32>("/a").await.unwrap();

        assert_eq!(*first.await.unwrap().unwrap(), 1);
        assert_eq!(*again, 1);
        assert_eq!(fetch.count("/a"), 1);
    }
}
