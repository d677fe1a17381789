//! Result cache trait.
//!
//! The cache is an injected collaborator, never ambient state: the
//! pipeline receives one handle and callers decide the backend.
//!
//! # Available Implementations
//!
//! | Backend | Use Case |
//! |---------|----------|
//! | [`MemoryCache`](crate::storage::MemoryCache) | Default; single process |
//! | `RedisCache` | Shared across instances (feature `redis`) |
//!
//! # Degradation
//!
//! Every error from these methods is absorbed by the pipeline: a failed
//! read falls through to a full search, a failed write is logged and the
//! response is still served. Backends should therefore report errors
//! precisely rather than retry internally.

use crate::Result;
use std::time::Duration;

/// Trait for response cache backends.
///
/// Values are opaque serialized payloads; keys are prefixed by surface
/// (`search:`, `autocomplete:`) so unrelated caches can be invalidated
/// independently.
pub trait ResultCache: Send + Sync {
    /// Fetches a cached payload, `None` on miss or expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a payload under a key with a time-to-live.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the
    /// write.
    fn set_with_ttl(&self, key: &str, payload: &str, ttl: Duration) -> Result<()>;

    /// Removes every entry whose key starts with the prefix, returning
    /// how many were removed.
    ///
    /// Catalog writers call this on product updates; the search path
    /// itself never invalidates.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    fn invalidate_prefix(&self, prefix: &str) -> Result<u64>;
}
