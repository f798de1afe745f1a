//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 60;
const DEFAULT_ENTRY_LIMIT: usize = 1024;

/// Cache configuration from `carta.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the cache layer. When disabled every read goes to the store.
    pub enabled: bool,
    /// Time-to-live for cache entries, in seconds.
    pub ttl_secs: u64,
    /// Maximum number of entries held by the in-process backend.
    pub entry_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL_SECS,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Returns the entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entry_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
