//! Storage layer abstraction.
//!
//! The engine consumes stores, it never owns them:
//! - **Retrieval**: candidate products and shops ([`ProductRetriever`],
//!   [`ShopRetriever`])
//! - **Cache**: serialized responses with TTLs ([`ResultCache`])
//! - **Suggestions**: the three suggestion sources ([`SuggestionBackend`])
//!
//! In-memory reference implementations back the CLI and tests; the Redis
//! cache backend is available behind the `redis` feature.

// Allow cast precision loss for metric gauges where exact precision is not critical.
#![allow(clippy::cast_precision_loss)]

pub mod cache;
pub mod memory;
pub mod traits;

pub use cache::{MemoryCache, RedisCache};
pub use memory::{CatalogFile, InMemoryCatalog, InMemorySuggestions, PopularTerms, SuggestionEntry};
pub use traits::{ProductRetriever, ResultCache, ShopRetriever, SuggestionBackend};
