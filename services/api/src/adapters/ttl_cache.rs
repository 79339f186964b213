//! services/api/src/adapters/ttl_cache.rs
//!
//! A read-through memo of provider responses keyed by request URL.
//!
//! Entries are served until their expiry and then refetched. The map is bounded:
//! once `max_entries` is reached, expired entries are dropped first and then the
//! entry closest to expiry. Concurrent misses for the same key each run the fetcher;
//! there is no in-flight de-duplication.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    /// Zero means unbounded.
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            max_entries,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // Entries are plain data; a panic mid-insert cannot leave them half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value while it is still live.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut entries = self.lock();
        if self.max_entries > 0 && entries.len() >= self.max_entries && !entries.contains_key(&key)
        {
            Self::make_room(&mut entries, self.max_entries);
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn make_room(entries: &mut HashMap<String, CacheEntry<V>>, max_entries: usize) {
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);
        if entries.len() < max_entries {
            return;
        }
        let soonest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = soonest {
            debug!("Cache full, evicting {}", key);
            entries.remove(&key);
        }
    }

    /// Serves `key` from the cache, or runs `fetcher` and stores its value for `ttl`.
    ///
    /// A failed fetch is not cached; the error goes straight back to the caller.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Cache hit for {}", key);
            return Ok(value);
        }

        let value = fetcher().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.lock().retain(|_, entry| now < entry.expires_at);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
