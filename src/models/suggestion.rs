//! Suggestion types.

use serde::{Deserialize, Serialize};

/// Where a suggestion came from.
///
/// Declaration order is merge priority: curated prefix entries beat
/// popular searches, which beat top-selling titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Curated prefix table, ordered by stored weight.
    PrefixTable,
    /// Historical popular searches, ordered by count.
    PopularSearches,
    /// Titles of top-selling products, ordered by sales.
    TopSelling,
}

impl SuggestionSource {
    /// Returns the source as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrefixTable => "prefix_table",
            Self::PopularSearches => "popular_searches",
            Self::TopSelling => "top_selling",
        }
    }
}

/// A single suggested query term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The suggested term, as stored.
    pub term: String,
    /// Which source produced it.
    pub source: SuggestionSource,
}

impl Suggestion {
    /// Creates a suggestion.
    #[must_use]
    pub fn new(term: impl Into<String>, source: SuggestionSource) -> Self {
        Self {
            term: term.into(),
            source,
        }
    }
}
