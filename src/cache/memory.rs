use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheEntry, CacheKey, ResultCache};

/// Process-local result cache.
///
/// Unbounded unless configured. With `max_entries`, inserting past the bound
/// evicts the oldest entry by `created_at`. With a TTL, entries older than it
/// read as a miss and are dropped.
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    max_entries: Option<usize>,
    ttl: Option<Duration>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: None,
            ttl: None,
        }
    }

    /// Bound the entry count. Each insert past the bound scans every entry
    /// for the oldest `created_at`, and ordering follows the wall clock, so a
    /// clock stepping backwards can evict the newest entry.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max.max(1));
        self
    }

    /// Expire entries older than `ttl`. Expired entries are dropped when read
    /// and swept on every insert.
    pub fn with_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.ttl = Duration::from_std(ttl).ok();
        self
    }

    /// Full entry for a key, including its creation time.
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            Some(ttl) => Utc::now().signed_duration_since(entry.created_at) > ttl,
            None => false,
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !self.is_expired(entry) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| self.is_expired(e)) {
            entries.remove(key);
            debug!(key = %key, "cache entry expired");
        }
        None
    }

    async fn put(&self, key: CacheKey, value: Value) {
        let mut entries = self.entries.write().await;
        if self.ttl.is_some() {
            let before = entries.len();
            entries.retain(|_, e| !self.is_expired(e));
            let purged = before - entries.len();
            if purged > 0 {
                debug!(purged, "dropped expired cache entries");
            }
        }
        entries.insert(key.clone(), CacheEntry::new(key, value));

        if let Some(max) = self.max_entries {
            while entries.len() > max {
                let oldest = entries
                    .values()
                    .min_by_key(|e| e.created_at)
                    .map(|e| e.key.clone());
                match oldest {
                    Some(k) => {
                        entries.remove(&k);
                        debug!(key = %k, "evicted oldest cache entry");
                    }
                    None => break,
                }
            }
        }
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
