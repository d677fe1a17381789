//! Data models for soko.
//!
//! This module contains the core data structures used throughout the engine:
//! catalog records, request forms, response wire types, suggestions, and
//! analytics events.

mod events;
mod product;
mod request;
mod response;
mod suggestion;

pub use events::SearchEvent;
pub use product::{
    CategoryId, CategoryRef, GeoPoint, ListingStatus, Product, ProductId, Shop, ShopId, ShopRef,
};
pub use request::{
    AdvancedSearchBody, BodyFilters, BodyPagination, BodyPriceRange, DEFAULT_LIMIT,
    DEFAULT_RADIUS_KM, MAX_LIMIT, RawSearchParams, SearchRequest, SortBy, StructuredFilters,
};
pub use response::{
    AppliedFilters, AutocompleteEntry, FacetSet, Pagination, PopularSearch, PriceRangeFacets,
    ScoredProduct, SearchResponse, ShopHit, ShopSearchResponse,
};
pub use suggestion::{Suggestion, SuggestionSource};
