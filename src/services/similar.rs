//! Similar-product recommendations.
//!
//! Candidates come from the source product's own category within a
//! ±30% price window, then get scored on brand, price proximity, and
//! shared tags. Scoring is deliberately coarse: it ranks a small
//! over-fetched window, it does not search the whole catalog.

use crate::models::{Product, ProductId, StructuredFilters};
use crate::storage::ProductRetriever;
use crate::Result;
use std::sync::Arc;
use tracing::instrument;

/// Default recommendation count.
pub const DEFAULT_SIMILAR_LIMIT: usize = 10;
/// Upper bound on the recommendation count.
pub const MAX_SIMILAR_LIMIT: usize = 50;

/// Width of the candidate price window around the source price.
const PRICE_WINDOW: f64 = 0.3;
/// Candidates fetched per requested result; scoring reorders within
/// this window only.
const OVERFETCH_FACTOR: usize = 2;

/// Service recommending products similar to a given one.
pub struct SimilarityService {
    retriever: Arc<dyn ProductRetriever>,
}

impl SimilarityService {
    /// Creates a similarity service over the given store.
    #[must_use]
    pub fn new(retriever: Arc<dyn ProductRetriever>) -> Self {
        Self { retriever }
    }

    /// Returns up to `limit` products similar to `id`, best first.
    ///
    /// An unknown or inactive product yields an empty list rather than
    /// an error; recommendations are an accessory surface.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RetrievalFailed`] if the store cannot be
    /// queried.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn find_similar(&self, id: &ProductId, limit: usize) -> Result<Vec<Product>> {
        let limit = limit.clamp(1, MAX_SIMILAR_LIMIT);
        let Some(source) = self.retriever.get_product(id)? else {
            tracing::debug!("Source product not found, no recommendations");
            return Ok(Vec::new());
        };

        let filters = StructuredFilters {
            category: Some(source.category.id.clone()),
            min_price: Some(source.price * (1.0 - PRICE_WINDOW)),
            max_price: Some(source.price * (1.0 + PRICE_WINDOW)),
            brand_contains: source.brand.as_ref().map(|b| b.to_lowercase()),
            ..StructuredFilters::default()
        };

        let mut candidates: Vec<Product> = self
            .retriever
            .retrieve(&filters)?
            .into_iter()
            .filter(|candidate| candidate.id != source.id)
            .collect();
        // The substring filter above is recall; brand similarity wants
        // the exact same brand when the source has one.
        if source.brand.is_some() {
            candidates.retain(|candidate| candidate.brand == source.brand);
        }
        candidates.truncate(limit.saturating_mul(OVERFETCH_FACTOR));

        let mut scored: Vec<(usize, Product)> = candidates
            .into_iter()
            .map(|candidate| (similarity_score(&source, &candidate), candidate))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        scored.truncate(limit);

        tracing::debug!(recommended = scored.len(), "Computed similar products");
        Ok(scored.into_iter().map(|(_, product)| product).collect())
    }
}

/// Coarse similarity between a source product and a candidate.
///
/// Brand identity is worth 3 points, price proximity up to 3, and each
/// shared tag 1.
fn similarity_score(source: &Product, candidate: &Product) -> usize {
    let mut score = 0usize;

    if source.brand.is_some() && source.brand == candidate.brand {
        score += 3;
    }

    if source.price > 0.0 {
        let price_diff = (candidate.price - source.price).abs() / source.price;
        if price_diff < 0.1 {
            score += 3;
        } else if price_diff < 0.2 {
            score += 2;
        } else if price_diff < PRICE_WINDOW {
            score += 1;
        }
    }

    score += source
        .tags
        .iter()
        .filter(|tag| candidate.tags.contains(tag))
        .count();
    score
}
