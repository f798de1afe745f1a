//! Cache backend: a key-value store of opaque serialized blobs with TTL.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::time::Instant;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Key-value storage behind the cache engine.
///
/// Values are opaque to the backend. Implementations must fail open: a
/// backend that cannot reach its storage reports misses from `get` and turns
/// `set`/`delete` into no-ops rather than surfacing errors, because the store
/// of record stays authoritative either way.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up `key`. Absent and expired entries are both `None`.
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Store `value` under `key`, overwriting any existing entry. The entry
    /// reads as absent once `ttl` has elapsed.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration);

    /// Remove `key` immediately, regardless of remaining TTL. Deleting an
    /// absent key is a no-op.
    async fn delete(&self, key: &str);
}

struct Entry {
    value: Bytes,
    deadline: Instant,
}

/// In-process cache backend: an LRU map of TTL-stamped entries.
///
/// Expiry is lazy: an expired entry is dropped when it is next read. LRU
/// eviction bounds memory in between.
pub struct MemoryCache {
    entries: RwLock<LruCache<String, Entry>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.entry_limit_non_zero())),
        }
    }

    /// Number of stored entries, counting expired ones not yet dropped.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let live = match entries.get(key) {
            Some(entry) if entry.deadline > Instant::now() => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };
        match live {
            Some(value) => Some(value),
            None => {
                // Lazy expiry: the read that finds a dead entry drops it.
                entries.pop(key);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        let entry = Entry {
            value,
            deadline: Instant::now() + ttl,
        };
        rw_write(&self.entries, SOURCE, "set").put(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
    }
}
