//! Search request types and the canonical normalized form.

use super::{CategoryId, GeoPoint, ShopId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default page size when the caller gives none.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on page size; larger requests are clamped, not rejected.
pub const MAX_LIMIT: usize = 100;
/// Default search radius in kilometers for geo-filtered requests.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Sort order for search results.
///
/// A closed set: every variant carries its own comparator in
/// `services::sort`, so adding an order means adding a variant there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Fuzzy relevance, best first (default). Unranked results keep
    /// retrieval order.
    #[default]
    Relevance,
    /// Price, cheapest first.
    PriceAsc,
    /// Price, most expensive first.
    PriceDesc,
    /// Listing creation time, newest first.
    Newest,
    /// Popularity (views + 10 * sales), highest first.
    Popular,
    /// Distance from the caller, nearest first. Results without a
    /// distance sort last.
    Distance,
}

impl SortBy {
    /// Returns the order as its wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
            Self::Popular => "popular",
            Self::Distance => "distance",
        }
    }

    /// Parses a sort order leniently, falling back to [`Self::Relevance`]
    /// for anything unrecognized.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "newest" => Self::Newest,
            "popular" => Self::Popular,
            "distance" => Self::Distance,
            _ => Self::Relevance,
        }
    }
}

/// The canonical, normalized search request.
///
/// Produced by `services::normalizer` from either inbound form; every
/// field is already clamped and defaulted, so pipeline stages never
/// validate. Construction through [`Default`] plus the `with_*` setters
/// yields the same invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query. May be empty, which skips fuzzy ranking.
    pub query: String,
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Restrict to one shop.
    pub shop: Option<ShopId>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound. Never below `min_price`.
    pub max_price: Option<f64>,
    /// Case-insensitive brand substring.
    pub brand: Option<String>,
    /// Match products carrying any of these tags.
    pub tags: Vec<String>,
    /// Only in-stock products.
    pub in_stock: bool,
    /// Sort order.
    pub sort_by: SortBy,
    /// 1-based page number, always >= 1.
    pub page: u32,
    /// Page size, always in `[1, MAX_LIMIT]`.
    pub limit: usize,
    /// Caller location. Geo filtering applies only when present.
    pub user_location: Option<GeoPoint>,
    /// Search radius in kilometers, meaningful only with `user_location`.
    pub radius_km: f64,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: None,
            shop: None,
            min_price: None,
            max_price: None,
            brand: None,
            tags: Vec::new(),
            in_stock: false,
            sort_by: SortBy::Relevance,
            page: 1,
            limit: DEFAULT_LIMIT,
            user_location: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

impl SearchRequest {
    /// Creates a request for a free-text query with default paging.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Restricts the request to a category.
    #[must_use]
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Restricts the request to a shop.
    #[must_use]
    pub fn with_shop(mut self, shop: ShopId) -> Self {
        self.shop = Some(shop);
        self
    }

    /// Sets an inclusive price window. Swaps the bounds if given reversed.
    #[must_use]
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        if let (Some(lo), Some(hi)) = (self.min_price, self.max_price)
            && lo > hi
        {
            self.min_price = Some(hi);
            self.max_price = Some(lo);
        }
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Sets the page, clamped to >= 1.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = if page == 0 { 1 } else { page };
        self
    }

    /// Sets the page size, clamped to `[1, MAX_LIMIT]`.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 {
            1
        } else if limit > MAX_LIMIT {
            MAX_LIMIT
        } else {
            limit
        };
        self
    }

    /// Sets the caller location used for geo filtering.
    #[must_use]
    pub const fn with_location(mut self, location: GeoPoint, radius_km: f64) -> Self {
        self.user_location = Some(location);
        self.radius_km = radius_km;
        self
    }

    /// True when the query has matchable text (fuzzy ranking applies).
    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Derives the store-side filters from this request.
    ///
    /// Text tokens carry only words long enough to be selective; the
    /// store matches any of them for recall, and the fuzzy ranker
    /// restores precision afterwards.
    #[must_use]
    pub fn structured_filters(&self) -> StructuredFilters {
        StructuredFilters {
            category: self.category.clone(),
            shop: self.shop.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            brand_contains: self.brand.as_ref().map(|b| b.to_lowercase()),
            any_tags: self.tags.clone(),
            in_stock_only: self.in_stock,
            text_tokens: self
                .query
                .split_whitespace()
                .filter(|t| t.chars().count() > 2)
                .map(str::to_lowercase)
                .collect(),
        }
    }

    /// Deterministic fingerprint of this request for cache keying.
    ///
    /// SHA-256 over a canonical JSON encoding: fixed field order, tags
    /// sorted case-insensitively so tag order never fragments the cache.
    /// Equal normalized requests always produce equal fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        #[derive(Serialize)]
        struct Canonical<'a> {
            query: &'a str,
            category: Option<&'a str>,
            shop: Option<&'a str>,
            min_price: Option<f64>,
            max_price: Option<f64>,
            brand: Option<&'a str>,
            tags: Vec<String>,
            in_stock: bool,
            sort_by: &'static str,
            page: u32,
            limit: usize,
            location: Option<(f64, f64)>,
            radius_km: f64,
        }

        let mut tags: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
        tags.sort_unstable();

        let canonical = Canonical {
            query: self.query.as_str(),
            category: self.category.as_ref().map(CategoryId::as_str),
            shop: self.shop.as_ref().map(ShopId::as_str),
            min_price: self.min_price,
            max_price: self.max_price,
            brand: self.brand.as_deref(),
            tags,
            in_stock: self.in_stock,
            sort_by: self.sort_by.as_str(),
            page: self.page,
            limit: self.limit,
            location: self.user_location.map(|p| (p.lat, p.lng)),
            radius_km: self.radius_km,
        };

        // Struct serialization emits fields in declaration order, so the
        // encoding is stable without a map normalization pass.
        let encoded = serde_json::to_string(&canonical).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(encoded.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Store-side filter set derived from a [`SearchRequest`].
///
/// This is what a [`ProductRetriever`](crate::storage::ProductRetriever)
/// receives: exact and range predicates the store can evaluate natively,
/// with fuzzy text matching left to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredFilters {
    /// Exact category match.
    pub category: Option<CategoryId>,
    /// Exact shop match.
    pub shop: Option<ShopId>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Lowercased brand substring.
    pub brand_contains: Option<String>,
    /// Keep products carrying at least one of these tags.
    pub any_tags: Vec<String>,
    /// Keep only products with stock above zero.
    pub in_stock_only: bool,
    /// Lowercased query tokens for store-native text recall. Empty means
    /// no text constraint.
    pub text_tokens: Vec<String>,
}

/// Untyped query parameters as they arrive from an HTTP layer.
///
/// Every field is an optional string; `services::normalizer` owns all
/// parsing, clamping, and defaulting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    /// Free-text query (`q`).
    pub q: Option<String>,
    /// Category ID.
    pub category: Option<String>,
    /// Shop ID.
    pub shop: Option<String>,
    /// Minimum price.
    pub min_price: Option<String>,
    /// Maximum price.
    pub max_price: Option<String>,
    /// Brand substring.
    pub brand: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    /// `"true"` to keep only in-stock products.
    pub in_stock: Option<String>,
    /// Sort order name.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Caller latitude.
    pub lat: Option<String>,
    /// Caller longitude.
    pub lng: Option<String>,
    /// Radius in kilometers.
    pub radius: Option<String>,
}

impl RawSearchParams {
    /// Creates parameters carrying only a free-text query.
    #[must_use]
    pub fn from_query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }
}

/// Structured POST body for advanced search.
///
/// Normalizes to the same [`SearchRequest`] as the flat parameter form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedSearchBody {
    /// Free-text query.
    pub query: Option<String>,
    /// Category ID.
    pub category: Option<String>,
    /// Nested filter block.
    pub filters: Option<BodyFilters>,
    /// Sort order name.
    pub sort: Option<String>,
    /// Nested pagination block.
    pub pagination: Option<BodyPagination>,
    /// Caller location.
    pub location: Option<GeoPoint>,
    /// Radius in kilometers.
    pub radius: Option<f64>,
}

/// Filter block of an [`AdvancedSearchBody`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyFilters {
    /// Price window.
    pub price: Option<BodyPriceRange>,
    /// Brand substring.
    pub brand: Option<String>,
    /// Shop ID.
    pub shop: Option<String>,
    /// Tag list.
    pub tags: Option<Vec<String>>,
    /// Only in-stock products.
    pub in_stock: Option<bool>,
}

/// Price window of a [`BodyFilters`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BodyPriceRange {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

/// Pagination block of an [`AdvancedSearchBody`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BodyPagination {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<usize>,
}
