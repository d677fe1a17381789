//! Search pipeline services.
//!
//! [`SearchService`] orchestrates one search end to end; the other
//! modules are its stages (normalize, geo filter, fuzzy rank, facets,
//! sort) and the sibling surfaces (suggestions, similar products,
//! analytics). Stages are pure functions or small structs over slices,
//! so each is testable without a store.

pub mod analytics;
pub mod facets;
pub mod fuzzy;
pub mod geo;
pub mod normalizer;
pub mod search;
pub mod similar;
pub mod sort;
pub mod suggest;

pub use analytics::{AnalyticsDispatcher, AnalyticsSink, InMemoryAnalytics};
pub use fuzzy::FuzzyRanker;
pub use geo::GeoFilter;
pub use search::SearchService;
pub use similar::SimilarityService;
pub use sort::SortStrategy;
pub use suggest::SuggestionService;
