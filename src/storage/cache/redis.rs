//! Redis-based result cache.
//!
//! Shares cached responses across engine instances. Entries are plain
//! string values with server-side expiry (`SET ... EX`), so several
//! processes agree on TTLs without coordination.
//!
//! # Connection Pooling
//!
//! This backend reuses a single connection per instance. For
//! high-concurrency deployments, front it with a pooling layer; the
//! current implementation suits one engine per process.
//!
//! # Command Timeout
//!
//! Redis operations use a 5-second response timeout to prevent
//! indefinite blocking on slow or unresponsive servers. A timed-out
//! cache call degrades the request to a full search, nothing more.

#[cfg(feature = "redis")]
mod implementation {
    use crate::storage::traits::ResultCache;
    use crate::{Error, Result};
    use redis::{Client, Commands, Connection};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Default timeout for Redis operations.
    const REDIS_TIMEOUT: Duration = Duration::from_secs(5);

    /// Redis-backed result cache.
    ///
    /// # Connection Management
    ///
    /// Maintains a reusable connection via `Mutex<Option<Connection>>`.
    /// The connection is lazily established and returned after each
    /// operation; a broken connection is simply dropped and the next
    /// call dials fresh.
    pub struct RedisCache {
        /// Redis client.
        client: Client,
        /// Cached connection for reuse.
        connection: Mutex<Option<Connection>>,
    }

    impl RedisCache {
        /// Creates a new Redis cache.
        ///
        /// # Errors
        ///
        /// Returns an error if the connection URL is invalid.
        pub fn new(connection_url: &str) -> Result<Self> {
            let client = Client::open(connection_url).map_err(|e| Error::CacheUnavailable {
                operation: "redis_connect".to_string(),
                cause: e.to_string(),
            })?;

            Ok(Self {
                client,
                connection: Mutex::new(None),
            })
        }

        /// Creates a cache with default settings.
        ///
        /// # Errors
        ///
        /// Returns an error if the connection URL is invalid.
        pub fn with_defaults() -> Result<Self> {
            Self::new("redis://localhost:6379")
        }

        /// Gets a connection, reusing the cached one if available.
        fn get_connection(&self) -> Result<Connection> {
            let mut guard = self.connection.lock().map_err(|e| Error::CacheUnavailable {
                operation: "redis_lock_connection".to_string(),
                cause: e.to_string(),
            })?;

            if let Some(conn) = guard.take() {
                // If this connection turns out broken the caller gets an
                // error and the next call dials fresh.
                return Ok(conn);
            }

            let conn = self
                .client
                .get_connection()
                .map_err(|e| Error::CacheUnavailable {
                    operation: "redis_get_connection".to_string(),
                    cause: e.to_string(),
                })?;

            conn.set_read_timeout(Some(REDIS_TIMEOUT))
                .map_err(|e| Error::CacheUnavailable {
                    operation: "redis_set_read_timeout".to_string(),
                    cause: e.to_string(),
                })?;
            conn.set_write_timeout(Some(REDIS_TIMEOUT))
                .map_err(|e| Error::CacheUnavailable {
                    operation: "redis_set_write_timeout".to_string(),
                    cause: e.to_string(),
                })?;

            Ok(conn)
        }

        /// Returns a connection to the cache for reuse.
        fn return_connection(&self, conn: Connection) {
            if let Ok(mut guard) = self.connection.lock() {
                *guard = Some(conn);
            }
            // If the lock fails, just drop the connection.
        }
    }

    impl ResultCache for RedisCache {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let mut conn = self.get_connection()?;

            let result: redis::RedisResult<Option<String>> = conn.get(key);

            let output = result.map_err(|e| Error::CacheUnavailable {
                operation: "redis_get".to_string(),
                cause: e.to_string(),
            });
            self.return_connection(conn);
            output
        }

        fn set_with_ttl(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
            let mut conn = self.get_connection()?;

            // SETEX rejects a zero expiry; round sub-second TTLs up.
            let secs = ttl.as_secs().max(1);
            let result: redis::RedisResult<()> = conn.set_ex(key, payload, secs);

            let output = result.map_err(|e| Error::CacheUnavailable {
                operation: "redis_set_ex".to_string(),
                cause: e.to_string(),
            });
            self.return_connection(conn);
            output
        }

        fn invalidate_prefix(&self, prefix: &str) -> Result<u64> {
            let mut conn = self.get_connection()?;
            let pattern = format!("{prefix}*");

            let keys: Vec<String> = {
                let iter = match conn.scan_match::<_, String>(&pattern) {
                    Ok(iter) => iter,
                    Err(e) => {
                        // Connection state is unknown mid-scan; drop it.
                        return Err(Error::CacheUnavailable {
                            operation: "redis_scan".to_string(),
                            cause: e.to_string(),
                        });
                    },
                };
                iter.collect::<redis::RedisResult<Vec<String>>>()
                    .map_err(|e| Error::CacheUnavailable {
                        operation: "redis_scan".to_string(),
                        cause: e.to_string(),
                    })?
            };

            if keys.is_empty() {
                self.return_connection(conn);
                return Ok(0);
            }

            let result: redis::RedisResult<u64> = conn.del(&keys);
            let output = result.map_err(|e| Error::CacheUnavailable {
                operation: "redis_del".to_string(),
                cause: e.to_string(),
            });
            self.return_connection(conn);
            output
        }
    }
}

#[cfg(feature = "redis")]
pub use implementation::RedisCache;

#[cfg(not(feature = "redis"))]
mod stub {
    use crate::storage::traits::ResultCache;
    use crate::{Error, Result};
    use std::time::Duration;

    /// Stub Redis cache when the feature is not enabled.
    pub struct RedisCache;

    impl RedisCache {
        /// Creates a new Redis cache (stub).
        ///
        /// # Errors
        ///
        /// Always returns an error because the feature is not enabled.
        pub fn new(_connection_url: &str) -> Result<Self> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        /// Creates a cache with default settings (stub).
        ///
        /// # Errors
        ///
        /// Always returns an error because the feature is not enabled.
        pub fn with_defaults() -> Result<Self> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }
    }

    impl ResultCache for RedisCache {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        fn set_with_ttl(&self, _key: &str, _payload: &str, _ttl: Duration) -> Result<()> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        fn invalidate_prefix(&self, _prefix: &str) -> Result<u64> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }
    }
}

#[cfg(not(feature = "redis"))]
pub use stub::RedisCache;
