pub mod key;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use key::{canonicalize, CacheKey};
pub use memory::InMemoryCache;

/// A stored result. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Value,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: CacheKey, value: Value) -> Self {
        Self {
            key,
            value,
            created_at: Utc::now(),
        }
    }
}

/// Pluggable result store. In-memory by default; implement this to back
/// results with something else.
///
/// Concurrent callers may both miss and both compute the same key; the last
/// `put` wins. Implementations must never hand back a partially written value.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Value>;

    async fn put(&self, key: CacheKey, value: Value);

    async fn len(&self) -> usize;

    async fn clear(&self);
}

/// Stores nothing. Every lookup misses.
pub struct NoCache;

#[async_trait]
impl ResultCache for NoCache {
    async fn get(&self, _: &CacheKey) -> Option<Value> {
        None
    }

    async fn put(&self, _: CacheKey, _: Value) {}

    async fn len(&self) -> usize {
        0
    }

    async fn clear(&self) {}
}
