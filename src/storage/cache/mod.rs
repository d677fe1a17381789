//! Result cache backends.
//!
//! Both backends implement [`ResultCache`](crate::storage::ResultCache).
//! The in-memory backend is the default; the Redis backend shares cached
//! responses across engine instances and is gated behind the `redis`
//! cargo feature.

mod memory;
mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;
