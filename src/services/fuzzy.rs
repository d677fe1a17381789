//! Weighted multi-field fuzzy ranking.
//!
//! Candidates that already passed structured filtering are scored against
//! the free-text query across five weighted fields:
//!
//! | Field        | Weight |
//! |--------------|--------|
//! | title        | 0.4    |
//! | description  | 0.2    |
//! | brand        | 0.2    |
//! | tags         | 0.1    |
//! | category     | 0.1    |
//!
//! # Algorithm
//!
//! The query is lowercased and split on whitespace; tokens shorter than
//! the configured minimum are ignored. For each field, every token is
//! matched against every word of the field text:
//!
//! ```text
//! word_distance  = levenshtein(token, word) / max(|token|, |word|)
//! position       = word_start_chars / distance_tolerance
//! token_distance = min(1.0, word_distance + position)
//! ```
//!
//! A token keeps its best (lowest) distance over the field's words, and
//! the field distance is the mean over tokens. Fields whose distance is
//! at most the threshold count as matching; the candidate's relevance is
//! one minus the weighted mean distance over matching fields only, so a
//! strong title match is not diluted by fields that missed entirely.
//! Candidates where no field matches are excluded from the results.
//!
//! The position term mirrors how prefix-anchored matchers penalise hits
//! deep inside long text: an exact word 30 characters into a description
//! sits right at the default threshold, and anything deeper only counts
//! if the edit distance is zero and the field is short.

use crate::config::FuzzyConfig;
use crate::models::{Product, ScoredProduct};
use tracing::instrument;

/// Weight applied to title matches.
const TITLE_WEIGHT: f32 = 0.4;
/// Weight applied to description matches.
const DESCRIPTION_WEIGHT: f32 = 0.2;
/// Weight applied to brand matches.
const BRAND_WEIGHT: f32 = 0.2;
/// Weight applied to tag matches.
const TAGS_WEIGHT: f32 = 0.1;
/// Weight applied to category name matches.
const CATEGORY_WEIGHT: f32 = 0.1;

/// Fuzzy ranker over structured-filter survivors.
#[derive(Debug, Clone, Default)]
pub struct FuzzyRanker {
    config: FuzzyConfig,
}

impl FuzzyRanker {
    /// Creates a ranker with default tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ranker with the given tunables.
    #[must_use]
    pub const fn with_config(config: FuzzyConfig) -> Self {
        Self { config }
    }

    /// Splits a query into usable lowercase tokens.
    ///
    /// Tokens shorter than `min_token_length` carry too little signal
    /// and are dropped. An empty return means the query cannot rank and
    /// the caller should skip the fuzzy stage.
    #[must_use]
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        query
            .split_whitespace()
            .filter(|token| token.chars().count() >= self.config.min_token_length)
            .map(str::to_lowercase)
            .collect()
    }

    /// Scores candidates against `query`, drops non-matches, and fills
    /// in `relevance_score` on the survivors.
    ///
    /// Retrieval order is preserved; ordering by score is the sort
    /// stage's job. With no usable query tokens the candidates pass
    /// through untouched and unscored.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub fn rank(&self, query: &str, mut candidates: Vec<ScoredProduct>) -> Vec<ScoredProduct> {
        let tokens = self.tokenize(query);
        if tokens.is_empty() {
            return candidates;
        }

        let before = candidates.len();
        candidates.retain_mut(|candidate| {
            self.score_product(&tokens, &candidate.product)
                .is_some_and(|score| {
                    candidate.relevance_score = Some(score);
                    true
                })
        });

        metrics::counter!("search_fuzzy_excluded_total")
            .increment((before - candidates.len()) as u64);
        tracing::debug!(
            before = before,
            kept = candidates.len(),
            "Ranked candidates against query"
        );
        candidates
    }

    /// Relevance for one product, or `None` when no field matches.
    fn score_product(&self, tokens: &[String], product: &Product) -> Option<f32> {
        let tags_joined = product.tags.join(" ");
        let fields: [(f32, &str); 5] = [
            (TITLE_WEIGHT, product.title.as_str()),
            (DESCRIPTION_WEIGHT, product.description.as_str()),
            (BRAND_WEIGHT, product.brand.as_deref().unwrap_or("")),
            (TAGS_WEIGHT, tags_joined.as_str()),
            (CATEGORY_WEIGHT, product.category.name.as_str()),
        ];

        let mut weighted_distance = 0.0f32;
        let mut weight_sum = 0.0f32;
        for (weight, text) in fields {
            if let Some(distance) = self.field_distance(tokens, text)
                && distance <= self.config.threshold
            {
                weighted_distance += weight * distance;
                weight_sum += weight;
            }
        }

        if weight_sum == 0.0 {
            None
        } else {
            Some((1.0 - weighted_distance / weight_sum).clamp(0.0, 1.0))
        }
    }

    /// Mean over tokens of the best word distance within one field.
    ///
    /// Returns `None` for empty fields, which therefore can never match.
    fn field_distance(&self, tokens: &[String], text: &str) -> Option<f32> {
        let words = words_with_offsets(text);
        if words.is_empty() {
            return None;
        }

        let total: f32 = tokens
            .iter()
            .map(|token| self.token_distance(token, &words))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        Some(total / tokens.len() as f32)
    }

    /// Best penalized distance of one token over a field's words.
    fn token_distance(&self, token: &str, words: &[(usize, String)]) -> f32 {
        let token_len = token.chars().count();
        let mut best = 1.0f32;
        for (offset, word) in words {
            let word_len = word.chars().count();
            #[allow(clippy::cast_precision_loss)]
            let edit = levenshtein(token, word) as f32 / token_len.max(word_len) as f32;
            #[allow(clippy::cast_precision_loss)]
            let position = *offset as f32 / self.config.distance_tolerance as f32;
            let distance = (edit + position).min(1.0);
            if distance < best {
                best = distance;
            }
            if best == 0.0 {
                break;
            }
        }
        best
    }
}

/// Lowercased words of `text` with their starting character offsets.
fn words_with_offsets(text: &str) -> Vec<(usize, String)> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    for (index, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                words.push((start, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                start = index;
            }
            current.extend(ch.to_lowercase());
        }
    }
    if !current.is_empty() {
        words.push((start, current));
    }
    words
}

/// Classic two-row Levenshtein edit distance over characters.
fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let substitution = usize::from(a_ch != b_ch);
            current[j + 1] = (previous[j] + substitution)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, CategoryRef, ListingStatus, ProductId, ShopId, ShopRef};
    use chrono::Utc;

    fn product(id: &str, title: &str, description: &str, brand: Option<&str>) -> ScoredProduct {
        ScoredProduct::from(Product {
            id: ProductId::new(id),
            title: title.to_string(),
            description: description.to_string(),
            brand: brand.map(str::to_string),
            tags: vec!["sport".to_string()],
            category: CategoryRef {
                id: CategoryId::new("mode"),
                name: "Mode".to_string(),
            },
            shop: ShopRef {
                id: ShopId::new("shop-1"),
                name: "Boutique".to_string(),
                location: None,
            },
            price: 15_000.0,
            stock: 3,
            created_at: Utc::now(),
            views: 0,
            sales_count: 0,
            status: ListingStatus::Active,
        })
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("chaussure", "chaussure"), 0);
        assert_eq!(levenshtein("chaussure", "chaussures"), 1);
        assert_eq!(levenshtein("telefone", "telephone"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_words_with_offsets() {
        let words = words_with_offsets("Chaussures de Sport");
        assert_eq!(
            words,
            vec![
                (0, "chaussures".to_string()),
                (11, "de".to_string()),
                (14, "sport".to_string()),
            ]
        );
        assert!(words_with_offsets("   ").is_empty());
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        let ranker = FuzzyRanker::new();
        assert_eq!(ranker.tokenize("Robe a la mode"), vec!["robe", "la", "mode"]);
        assert!(ranker.tokenize("a b").is_empty());
        assert!(ranker.tokenize("").is_empty());
    }

    #[test]
    fn test_exact_title_match_scores_high() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank(
            "chaussures",
            vec![product("p1", "Chaussures de sport", "", None)],
        );
        assert_eq!(ranked.len(), 1);
        let score = ranked[0].relevance_score.unwrap();
        assert!(score > 0.95, "exact match scored only {score}");
    }

    #[test]
    fn test_singular_matches_plural_title() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank(
            "chaussure",
            vec![product("p1", "Chaussures de sport", "", None)],
        );
        assert_eq!(ranked.len(), 1);
        let score = ranked[0].relevance_score.unwrap();
        assert!(score > 0.8, "near match scored only {score}");
    }

    #[test]
    fn test_typo_within_threshold_matches() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank("telefone", vec![product("p1", "Telephone Samsung", "", None)]);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_unrelated_candidate_excluded() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank(
            "ordinateur",
            vec![
                product("p1", "Robe wax", "Tissu africain", None),
                product("p2", "Ordinateur portable", "", None),
            ],
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].product.id.as_str(), "p2");
    }

    #[test]
    fn test_brand_match_counts() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank("samsung", vec![product("p1", "Telephone", "", Some("Samsung"))]);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].relevance_score.unwrap() > 0.9);
    }

    #[test]
    fn test_deep_description_match_fails_position_penalty() {
        let ranker = FuzzyRanker::new();
        let description = "Un produit de tres bonne qualite pour la maison et le jardin clavier";
        let ranked = ranker.rank("clavier", vec![product("p1", "Souris sans fil", description, None)]);
        // "clavier" sits more than 30 characters in, past what the
        // threshold allows for a position-penalised match.
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_short_tokens_pass_through_unscored() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank("a", vec![product("p1", "Robe wax", "", None)]);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].relevance_score.is_none());
    }

    #[test]
    fn test_exact_title_outranks_inexact_tag() {
        let ranker = FuzzyRanker::new();
        let mut tagged = product("p2", "Maillot de bain", "", None);
        tagged.product.tags = vec!["chaussure".to_string()];
        let ranked = ranker.rank(
            "chaussures",
            vec![product("p1", "Chaussures de ville", "", None), tagged],
        );
        assert_eq!(ranked.len(), 2);
        let title_score = ranked[0].relevance_score.unwrap();
        let tag_score = ranked[1].relevance_score.unwrap();
        assert!(title_score > tag_score);
    }

    #[test]
    fn test_multi_token_query_averages_tokens() {
        let ranker = FuzzyRanker::new();
        let ranked = ranker.rank(
            "chaussures sport",
            vec![product("p1", "Chaussures de sport", "", None)],
        );
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].relevance_score.unwrap() > 0.8);
    }

    #[test]
    fn test_custom_threshold_is_honored() {
        let strict = FuzzyRanker::with_config(FuzzyConfig {
            threshold: 0.05,
            ..FuzzyConfig::default()
        });
        let ranked = strict.rank("chaussure", vec![product("p1", "Chaussures", "", None)]);
        // One edit over ten characters is 0.1, past a 0.05 threshold.
        assert!(ranked.is_empty());
    }
}
