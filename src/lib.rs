//! # Soko
//!
//! Product search and ranking engine for marketplace backends.
//!
//! Soko takes a raw search request, normalizes it, retrieves candidates
//! from an injected store, then filters by distance, ranks by fuzzy
//! relevance, aggregates facets, sorts, paginates, and caches the result.
//! Auxiliary services degrade gracefully: a broken cache or a slow
//! suggestion source never fails a search, only the candidate store can.
//!
//! ## Features
//!
//! - Weighted multi-field fuzzy ranking with a fixed exclusion threshold
//! - Haversine radius filtering with per-result distances
//! - Facet counts (category, brand, shop, price buckets, stock) computed
//!   before pagination
//! - Deterministic request fingerprints for TTL-based result caching
//! - Three-source query suggestions with bounded per-source timeouts
//! - Fire-and-forget search analytics over a broadcast event bus
//!
//! ## Example
//!
//! ```rust,ignore
//! use soko::{InMemoryCatalog, RawSearchParams, SearchService};
//!
//! let catalog = Arc::new(InMemoryCatalog::new(products, shops));
//! let service = SearchService::new(catalog).with_cache(cache);
//! let response = service.search(&RawSearchParams::from_query("ankara dress"))?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive
// dependencies, e.g. via criterion and tracing-subscriber).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{CacheConfig, EngineConfig, FuzzyConfig, SuggestConfig};
pub use models::{
    AdvancedSearchBody, AppliedFilters, AutocompleteEntry, CategoryId, FacetSet, GeoPoint,
    ListingStatus, Pagination, PopularSearch, Product, ProductId, RawSearchParams, ScoredProduct,
    SearchEvent, SearchRequest, SearchResponse, Shop, ShopHit, ShopId, ShopSearchResponse, SortBy,
    StructuredFilters, Suggestion, SuggestionSource,
};
pub use observability::EventBus;
pub use services::{
    AnalyticsDispatcher, AnalyticsSink, SearchService, SimilarityService, SuggestionService,
};
pub use storage::{
    InMemoryCatalog, MemoryCache, ProductRetriever, ResultCache, ShopRetriever, SuggestionBackend,
};

/// Error type for soko operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed catalog files, library API misuse |
/// | `RetrievalFailed` | The candidate store errors or times out |
/// | `CacheUnavailable` | A cache backend read or write fails |
/// | `FeatureNotEnabled` | Using backends requiring compile-time flags |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A catalog file fails to parse
    /// - A caller hands the library an out-of-contract value
    ///
    /// Request normalization never raises this: out-of-range request
    /// parameters are clamped or defaulted instead.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The candidate store failed to produce results.
    ///
    /// Raised when:
    /// - The retriever backend returns an error
    /// - The retriever backend times out
    ///
    /// This is the only error a search call surfaces to its caller; it is
    /// always distinguishable from an empty result set.
    #[error("retrieval '{operation}' failed: {cause}")]
    RetrievalFailed {
        /// The retrieval operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A cache backend is unreachable or misbehaving.
    ///
    /// Raised when:
    /// - A cache read or write fails
    /// - A cache connection cannot be established
    ///
    /// The search pipeline absorbs this variant (logged and counted); it
    /// is public so backends can report precisely.
    #[error("cache '{operation}' unavailable: {cause}")]
    CacheUnavailable {
        /// The cache operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Feature not enabled (requires feature flag).
    ///
    /// Raised when:
    /// - The Redis cache backend is constructed without the `redis` feature
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

/// Result type alias for soko operations.
pub type Result<T> = std::result::Result<T, Error>;
