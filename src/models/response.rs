//! Search response wire types.
//!
//! Everything here serializes with serde and round-trips through the
//! result cache unchanged, so field names and shapes are part of the
//! engine's contract.

use super::{Product, SearchRequest, Shop, SortBy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product annotated with per-request scoring.
///
/// Annotations are transient: they belong to one search execution and are
/// never written back to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    /// The underlying product record.
    #[serde(flatten)]
    pub product: Product,
    /// Fuzzy relevance in `[0, 1]`, 1 best. `None` when the request had
    /// no query text.
    #[serde(rename = "relevanceScore", skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f32>,
    /// Distance from the caller in kilometers. `None` when the request
    /// had no location.
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl ScoredProduct {
    /// Wraps a product with no annotations yet.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            relevance_score: None,
            distance_km: None,
        }
    }

    /// Relevance treating unranked as zero, the value every consumer
    /// sorts and compares by.
    #[must_use]
    pub fn relevance_or_zero(&self) -> f32 {
        self.relevance_score.unwrap_or(0.0)
    }
}

impl From<Product> for ScoredProduct {
    fn from(product: Product) -> Self {
        Self::new(product)
    }
}

/// Pagination block of a search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number served.
    pub page: u32,
    /// Requested page size.
    pub limit: usize,
    /// Total matches before pagination.
    pub total: usize,
    /// Total pages at this page size (ceiling division).
    pub total_pages: u32,
    /// True when pages remain after this one.
    pub has_more: bool,
}

impl Pagination {
    /// Builds the block from a total match count.
    #[must_use]
    pub fn new(page: u32, limit: usize, total: usize) -> Self {
        let total_pages = u32::try_from(total.div_ceil(limit.max(1))).unwrap_or(u32::MAX);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

/// Fixed price histogram used in facets.
///
/// Bucket bounds are in minor currency units and match the marketplace's
/// browse UI, so they are part of the wire contract rather than
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRangeFacets {
    /// Up to 10 000 exclusive.
    #[serde(rename = "0-10000")]
    pub up_to_10k: u64,
    /// 10 000 to 50 000 exclusive.
    #[serde(rename = "10000-50000")]
    pub up_to_50k: u64,
    /// 50 000 to 100 000 exclusive.
    #[serde(rename = "50000-100000")]
    pub up_to_100k: u64,
    /// 100 000 and above.
    #[serde(rename = "100000+")]
    pub over_100k: u64,
}

impl PriceRangeFacets {
    /// Counts a price into its bucket.
    pub const fn add(&mut self, price: f64) {
        if price < 10_000.0 {
            self.up_to_10k += 1;
        } else if price < 50_000.0 {
            self.up_to_50k += 1;
        } else if price < 100_000.0 {
            self.up_to_100k += 1;
        } else {
            self.over_100k += 1;
        }
    }

    /// Sum over all buckets. Always equals the faceted result count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.up_to_10k + self.up_to_50k + self.up_to_100k + self.over_100k
    }
}

/// Facet counts over the full filtered result set, pre-pagination.
///
/// `BTreeMap` keeps serialization order deterministic so cached
/// payloads stay byte-stable across identical searches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacetSet {
    /// Matches per category name.
    pub categories: BTreeMap<String, u64>,
    /// Matches per brand.
    pub brands: BTreeMap<String, u64>,
    /// Matches per shop name.
    pub shops: BTreeMap<String, u64>,
    /// Price histogram.
    pub price_ranges: PriceRangeFacets,
    /// Matches with stock above zero.
    pub in_stock: u64,
}

/// Echo of the filters a search actually applied after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    /// The query text as normalized.
    pub query: String,
    /// Category filter.
    pub category: Option<String>,
    /// Shop filter.
    pub shop: Option<String>,
    /// Lower price bound.
    pub min_price: Option<f64>,
    /// Upper price bound.
    pub max_price: Option<f64>,
    /// Brand substring filter.
    pub brand: Option<String>,
    /// Tag filters.
    pub tags: Vec<String>,
    /// In-stock restriction.
    pub in_stock: bool,
    /// Sort order applied.
    pub sort_by: SortBy,
}

impl From<&SearchRequest> for AppliedFilters {
    fn from(request: &SearchRequest) -> Self {
        Self {
            query: request.query.clone(),
            category: request.category.as_ref().map(ToString::to_string),
            shop: request.shop.as_ref().map(ToString::to_string),
            min_price: request.min_price,
            max_price: request.max_price,
            brand: request.brand.clone(),
            tags: request.tags.clone(),
            in_stock: request.in_stock,
            sort_by: request.sort_by,
        }
    }
}

/// Complete result of one search execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The requested page of results.
    pub products: Vec<ScoredProduct>,
    /// Pagination block.
    pub pagination: Pagination,
    /// Applied-filter echo.
    pub filters: AppliedFilters,
    /// Related query suggestions. Empty when no suggestion service is
    /// wired or the query was too short.
    pub suggestions: Vec<String>,
    /// Facets over the full filtered set.
    pub facets: FacetSet,
}

/// A shop annotated with its distance from the caller.
///
/// Unlike products, shops without coordinates stay in geo-filtered shop
/// results with a null distance and sort last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopHit {
    /// The shop record.
    #[serde(flatten)]
    pub shop: Shop,
    /// Distance in kilometers, null when the shop has no coordinates.
    pub distance: Option<f64>,
}

/// Result of a shop search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSearchResponse {
    /// Matching shops, nearest first when a location was given.
    pub shops: Vec<ShopHit>,
    /// Total matches.
    pub total: usize,
}

/// One autocomplete hit: just enough to render a typeahead row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteEntry {
    /// Product ID for navigation.
    pub id: super::ProductId,
    /// Product title.
    pub title: String,
    /// Product price.
    pub price: f64,
}

/// A popular search term with its historical count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularSearch {
    /// The search term, lowercased.
    pub term: String,
    /// How many times it was searched.
    pub count: u64,
}
