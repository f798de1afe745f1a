//! Cache invalidation engine.
//!
//! Mediates the read and write paths through the cache backend: aggregate
//! views are serialized on the way in and deserialized on the way out, and
//! every mutation drops its full keyset. The engine never surfaces cache
//! failures; an undecodable or unreachable entry is a miss, nothing more.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::{CacheKey, Mutation};
use super::store::CacheBackend;

pub struct CacheEngine {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    ttl: Duration,
}

impl CacheEngine {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            enabled: config.enabled,
            ttl: config.ttl(),
        }
    }

    /// Look up `key` and deserialize the stored view.
    ///
    /// Returns `None` on absence, TTL expiry, a disabled cache, or a payload
    /// that no longer decodes (stale shape after an upgrade).
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let rendered = key.to_string();
        let Some(raw) = self.backend.get(&rendered).await else {
            counter!("carta_cache_miss_total").increment(1);
            return None;
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => {
                counter!("carta_cache_hit_total").increment(1);
                Some(value)
            }
            Err(error) => {
                warn!(key = %rendered, %error, "dropping undecodable cache entry");
                self.backend.delete(&rendered).await;
                counter!("carta_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Serialize `value` and store it under `key` with the configured TTL.
    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if !self.enabled {
            return;
        }

        match serde_json::to_vec(value) {
            Ok(raw) => {
                self.backend
                    .set(&key.to_string(), Bytes::from(raw), self.ttl)
                    .await;
            }
            Err(error) => {
                warn!(key = %key, %error, "failed to serialize cache value");
            }
        }
    }

    /// Drop `key` immediately. Idempotent.
    pub async fn invalidate(&self, key: &CacheKey) {
        if !self.enabled {
            return;
        }
        self.backend.delete(&key.to_string()).await;
        counter!("carta_cache_invalidate_total").increment(1);
    }

    /// Drop every key in the mutation's keyset.
    ///
    /// Callers must apply the store mutation first: invalidating before the
    /// store write would let a concurrent reader repopulate the cache with
    /// pre-mutation data that then survives past the invalidation.
    pub async fn invalidate_for(&self, mutation: &Mutation) {
        if !self.enabled {
            return;
        }
        let keyset = mutation.keyset();
        debug!(?mutation, keys = keyset.len(), "invalidating keyset");
        for key in &keyset {
            self.invalidate(key).await;
        }
    }
}
