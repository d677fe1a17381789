//! Product, shop, and category types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a shop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(String);

impl ShopId {
    /// Creates a new shop ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShopId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a new category ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true when both components are finite and within the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Listing status shared by products and shops.
///
/// Retriever backends only return `Active` records; the engine never
/// re-checks status on the search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in search and suggestions.
    #[default]
    Active,
    /// Hidden from all search surfaces.
    Inactive,
}

impl ListingStatus {
    /// Returns the status as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// True when the record is visible to search.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category identifier.
    pub id: CategoryId,
    /// Display name, used for fuzzy matching and facet labels.
    pub name: String,
}

/// Shop reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRef {
    /// Shop identifier.
    pub id: ShopId,
    /// Display name, used for facet labels.
    pub name: String,
    /// Shop coordinates. Products of shops without coordinates are
    /// dropped from geo-filtered results.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// A marketplace product as returned by the candidate store.
///
/// The engine treats products as read-only: it never mutates or persists
/// them, and per-request annotations (relevance, distance) live on
/// [`ScoredProduct`](super::ScoredProduct) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    #[serde(default)]
    pub description: String,
    /// Brand name, if declared by the seller.
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category the product is listed under.
    pub category: CategoryRef,
    /// Shop the product belongs to.
    pub shop: ShopRef,
    /// Price in minor currency units (CFA francs in the reference data).
    pub price: f64,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Listing creation time.
    pub created_at: DateTime<Utc>,
    /// Lifetime view count.
    #[serde(default)]
    pub views: u64,
    /// Lifetime sales count.
    #[serde(default)]
    pub sales_count: u64,
    /// Listing status.
    #[serde(default)]
    pub status: ListingStatus,
}

impl Product {
    /// Popularity score: views plus ten times sales.
    ///
    /// Saturating so pathological counters cannot wrap.
    #[must_use]
    pub const fn popularity(&self) -> u64 {
        self.views.saturating_add(self.sales_count.saturating_mul(10))
    }
}

/// A standalone shop record, used by shop search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    /// Unique identifier.
    pub id: ShopId,
    /// Shop name.
    pub name: String,
    /// Shop description.
    #[serde(default)]
    pub description: String,
    /// Shop coordinates, if the seller provided them.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Listing status.
    #[serde(default)]
    pub status: ListingStatus,
}
