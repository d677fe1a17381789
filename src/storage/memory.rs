//! In-memory reference backends.
//!
//! These back the CLI and the test suites: a catalog over owned vectors
//! that evaluates structured filters the way a SQL store would, a
//! suggestion backend over a curated table plus live search history, and
//! the shared popular-terms counter that links analytics to suggestions.

use crate::models::{PopularSearch, Product, ProductId, Shop, StructuredFilters};
use crate::storage::traits::{ProductRetriever, ShopRetriever, SuggestionBackend};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Shared counter of historical search terms.
///
/// The analytics sink increments it on every executed search; the
/// suggestion backend reads it for the popular-searches source. Clones
/// share state, so one instance can be handed to both.
///
/// Lock poisoning fails open: increments are skipped and reads come back
/// empty, matching the cache's degradation stance.
#[derive(Debug, Clone, Default)]
pub struct PopularTerms {
    counts: Arc<RwLock<HashMap<String, u64>>>,
}

impl PopularTerms {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one search for a term. Terms are trimmed and lowercased;
    /// empty terms are ignored.
    pub fn increment(&self, term: &str) {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return;
        }
        if let Ok(mut counts) = self.counts.write() {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    /// Returns the count recorded for a term.
    #[must_use]
    pub fn count(&self, term: &str) -> u64 {
        self.counts
            .read()
            .map(|counts| counts.get(&term.trim().to_lowercase()).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Terms containing `fragment`, ordered by count descending, ties by
    /// term ascending.
    #[must_use]
    pub fn matching(&self, fragment: &str, limit: usize) -> Vec<String> {
        let fragment = fragment.to_lowercase();
        let Ok(counts) = self.counts.read() else {
            return Vec::new();
        };

        let mut hits: Vec<(&String, u64)> = counts
            .iter()
            .filter(|(term, _)| term.contains(&fragment))
            .map(|(term, count)| (term, *count))
            .collect();
        hits.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hits.into_iter().take(limit).map(|(t, _)| t.clone()).collect()
    }

    /// The most-searched terms overall.
    #[must_use]
    pub fn top(&self, limit: usize) -> Vec<PopularSearch> {
        let Ok(counts) = self.counts.read() else {
            return Vec::new();
        };

        let mut all: Vec<PopularSearch> = counts
            .iter()
            .map(|(term, count)| PopularSearch {
                term: term.clone(),
                count: *count,
            })
            .collect();
        all.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        all.truncate(limit);
        all
    }
}

/// One row of the curated suggestion table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestionEntry {
    /// The suggested term.
    pub term: String,
    /// Ranking weight, higher first.
    #[serde(default)]
    pub weight: u32,
}

/// Catalog file format consumed by the CLI.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    /// Product records.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Shop records.
    #[serde(default)]
    pub shops: Vec<Shop>,
    /// Curated suggestion table.
    #[serde(default)]
    pub suggestions: Vec<SuggestionEntry>,
}

impl CatalogFile {
    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::InvalidInput(format!("cannot parse catalog {}: {e}", path.display()))
        })
    }
}

/// In-memory product and shop store.
///
/// Evaluates [`StructuredFilters`] the way the production store does:
/// exact and range predicates plus an any-token text hint for recall.
/// Precision filtering stays with the fuzzy ranker.
pub struct InMemoryCatalog {
    products: Vec<Product>,
    shops: Vec<Shop>,
}

impl InMemoryCatalog {
    /// Creates a catalog over owned records.
    #[must_use]
    pub const fn new(products: Vec<Product>, shops: Vec<Shop>) -> Self {
        Self { products, shops }
    }

    /// All products, in insertion order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All shops, in insertion order.
    #[must_use]
    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    fn matches(product: &Product, filters: &StructuredFilters) -> bool {
        if !product.status.is_active() {
            return false;
        }
        if let Some(category) = &filters.category
            && product.category.id != *category
        {
            return false;
        }
        if let Some(shop) = &filters.shop
            && product.shop.id != *shop
        {
            return false;
        }
        if let Some(min) = filters.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = filters.max_price
            && product.price > max
        {
            return false;
        }
        if let Some(brand) = &filters.brand_contains {
            let Some(product_brand) = &product.brand else {
                return false;
            };
            if !product_brand.to_lowercase().contains(brand) {
                return false;
            }
        }
        if !filters.any_tags.is_empty() {
            let product_tags: Vec<String> =
                product.tags.iter().map(|t| t.to_lowercase()).collect();
            let overlap = filters
                .any_tags
                .iter()
                .any(|t| product_tags.contains(&t.to_lowercase()));
            if !overlap {
                return false;
            }
        }
        if filters.in_stock_only && product.stock == 0 {
            return false;
        }
        if !filters.text_tokens.is_empty() {
            let haystack =
                format!("{} {}", product.title, product.description).to_lowercase();
            if !filters.text_tokens.iter().any(|t| haystack.contains(t)) {
                return false;
            }
        }
        true
    }
}

impl ProductRetriever for InMemoryCatalog {
    fn retrieve(&self, filters: &StructuredFilters) -> Result<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| Self::matches(p, filters))
            .cloned()
            .collect())
    }

    fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self
            .products
            .iter()
            .find(|p| p.id == *id && p.status.is_active())
            .cloned())
    }

    fn title_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Product>> {
        let prefix = prefix.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.status.is_active() && p.title.to_lowercase().starts_with(&prefix))
            .take(limit)
            .cloned()
            .collect())
    }
}

impl ShopRetriever for InMemoryCatalog {
    fn search_shops(&self, query: &str) -> Result<Vec<Shop>> {
        let query = query.trim().to_lowercase();
        Ok(self
            .shops
            .iter()
            .filter(|s| {
                s.status.is_active()
                    && (query.is_empty()
                        || s.name.to_lowercase().contains(&query)
                        || s.description.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }
}

/// Suggestion backend over the in-memory catalog plus search history.
pub struct InMemorySuggestions {
    catalog: Arc<InMemoryCatalog>,
    /// Curated entries, kept sorted by weight descending.
    prefix_table: Vec<SuggestionEntry>,
    popular: PopularTerms,
}

impl InMemorySuggestions {
    /// Creates a backend over a catalog, a curated table, and a shared
    /// popular-terms counter.
    #[must_use]
    pub fn new(
        catalog: Arc<InMemoryCatalog>,
        mut prefix_table: Vec<SuggestionEntry>,
        popular: PopularTerms,
    ) -> Self {
        prefix_table
            .sort_unstable_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
        Self {
            catalog,
            prefix_table,
            popular,
        }
    }
}

impl SuggestionBackend for InMemorySuggestions {
    fn prefix_suggestions(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let prefix = prefix.to_lowercase();
        Ok(self
            .prefix_table
            .iter()
            .filter(|e| e.term.to_lowercase().starts_with(&prefix))
            .take(limit)
            .map(|e| e.term.clone())
            .collect())
    }

    fn popular_searches(&self, fragment: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self.popular.matching(fragment, limit))
    }

    fn top_selling_titles(&self, fragment: &str, limit: usize) -> Result<Vec<String>> {
        let fragment = fragment.to_lowercase();
        let mut sellers: Vec<&Product> = self
            .catalog
            .products()
            .iter()
            .filter(|p| p.status.is_active() && p.title.to_lowercase().contains(&fragment))
            .collect();
        sellers.sort_unstable_by(|a, b| {
            b.sales_count
                .cmp(&a.sales_count)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(sellers
            .into_iter()
            .take(limit)
            .map(|p| p.title.clone())
            .collect())
    }

    fn top_popular(&self, limit: usize) -> Result<Vec<PopularSearch>> {
        Ok(self.popular.top(limit))
    }
}
