//! Suggestion source trait.

use crate::Result;
use crate::models::PopularSearch;

/// Trait for the three suggestion sources.
///
/// One backend serves all three lookups so implementations can share a
/// connection; the engine calls them concurrently and drops sources that
/// miss its deadline, so none of these should block indefinitely.
pub trait SuggestionBackend: Send + Sync {
    /// Curated suggestion terms starting with `prefix`, ordered by
    /// stored weight descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn prefix_suggestions(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;

    /// Historical search terms containing `fragment`, ordered by count
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn popular_searches(&self, fragment: &str, limit: usize) -> Result<Vec<String>>;

    /// Titles of top-selling products containing `fragment`, ordered by
    /// sales descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn top_selling_titles(&self, fragment: &str, limit: usize) -> Result<Vec<String>>;

    /// The most-searched terms overall, ordered by count descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn top_popular(&self, limit: usize) -> Result<Vec<PopularSearch>>;
}
