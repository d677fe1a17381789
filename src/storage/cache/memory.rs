//! In-memory result cache.
//!
//! An LRU map of serialized responses with per-entry TTLs. Suitable for
//! a single process; use the Redis backend when several engine instances
//! must share a cache.

use crate::Result;
use crate::storage::traits::ResultCache;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Entry in the result cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized response payload.
    payload: String,
    /// When this entry was stored.
    stored_at: Instant,
    /// How long the entry stays valid.
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        self.stored_at.elapsed() <= self.ttl
    }
}

/// In-memory LRU result cache with TTL-based expiration.
///
/// # Thread Safety
///
/// Uses `RwLock` for interior mutability, allowing concurrent reads and
/// exclusive writes. Safe to share via `Arc` across threads and tasks.
///
/// # Lock Poisoning
///
/// Lock poisoning is handled with fail-open semantics: a poisoned lock
/// reads as a miss and skips writes. Caching is a latency optimization,
/// not a correctness requirement, so a search that re-executes after a
/// panic elsewhere is the acceptable outcome.
///
/// # Expiration
///
/// Expired entries are not swept eagerly; they read as misses and fall
/// out under LRU pressure or on overwrite.
pub struct MemoryCache {
    /// LRU map from cache key to entry.
    cache: RwLock<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic for invalid input
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("capacity must be > 0");
        Self {
            cache: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Creates a cache with default settings.
    ///
    /// Default: 1024 entries.
    #[must_use]
    pub fn default_settings() -> Self {
        Self::new(1024)
    }

    /// Returns the current number of entries, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::default_settings()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Ok(cache) = self.cache.read() else {
            return Ok(None);
        };

        match cache.peek(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.payload.clone())),
            _ => Ok(None),
        }
    }

    fn set_with_ttl(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
        let entry = CacheEntry {
            payload: payload.to_string(),
            stored_at: Instant::now(),
            ttl,
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.put(key.to_string(), entry);
            metrics::gauge!("search_cache_entries").set(cache.len() as f64);
        }
        Ok(())
    }

    fn invalidate_prefix(&self, prefix: &str) -> Result<u64> {
        let Ok(mut cache) = self.cache.write() else {
            return Ok(0);
        };

        let doomed: Vec<String> = cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            cache.pop(key);
        }
        metrics::gauge!("search_cache_entries").set(cache.len() as f64);

        Ok(doomed.len() as u64)
    }
}
