//! Candidate retrieval traits.
//!
//! The engine never owns product or shop persistence. A retriever is the
//! boundary to whatever store the marketplace runs on; it evaluates the
//! exact and range predicates natively and leaves fuzzy text matching,
//! geo filtering, and ranking to the engine.
//!
//! # Contract
//!
//! - Only `Active` records are returned.
//! - Result order is unspecified; the engine sorts.
//! - Errors are fatal for the request: the engine does not retry and
//!   surfaces them as [`Error::RetrievalFailed`](crate::Error::RetrievalFailed).
//!
//! # Implementor Notes
//!
//! - Methods use `&self` to enable sharing via `Arc<dyn ProductRetriever>`
//! - Use interior mutability for connections or caches
//! - `text_tokens` is a recall hint: match any token, never all, and
//!   never rank by it

use crate::Result;
use crate::models::{Product, ProductId, Shop, StructuredFilters};

/// Trait for product candidate stores.
pub trait ProductRetriever: Send + Sync {
    /// Retrieves active products matching the structured filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the query fails.
    fn retrieve(&self, filters: &StructuredFilters) -> Result<Vec<Product>>;

    /// Retrieves a single product by ID.
    ///
    /// Returns `None` for unknown or inactive products.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the query fails.
    fn get_product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Retrieves active products whose title starts with the given
    /// prefix, case-insensitively, for autocomplete.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the query fails.
    fn title_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Product>>;
}

/// Trait for shop stores, used by shop search.
pub trait ShopRetriever: Send + Sync {
    /// Retrieves active shops whose name or description contains the
    /// query, case-insensitively. An empty query matches all.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the query fails.
    fn search_shops(&self, query: &str) -> Result<Vec<Shop>>;
}
