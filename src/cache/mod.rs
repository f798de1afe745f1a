//! Carta cache layer.
//!
//! A read-through, write-invalidate cache in front of the store of record:
//!
//! - **Backend** ([`store`]): a key-value store of opaque serialized blobs
//!   with per-entry TTL. The in-process implementation uses an LRU map.
//! - **Engine** ([`engine`]): serializes aggregate views into the backend and
//!   maps domain mutations to the keyset that must be dropped.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `carta.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_secs = 60
//! entry_limit = 1024
//! ```

mod config;
mod engine;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use engine::CacheEngine;
pub use keys::{CacheKey, Mutation};
pub use store::{CacheBackend, MemoryCache};
