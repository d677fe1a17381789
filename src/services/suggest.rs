//! Query suggestion service.
//!
//! Suggestions merge three sources: a curated prefix table, the running
//! popular-search counters, and titles of top-selling products. The
//! sources are independent lookups, so they run on their own threads
//! against a shared deadline; a source that misses the deadline or
//! fails is simply omitted from the merge rather than delaying or
//! failing the whole call.
//!
//! # Merge order
//!
//! Sources contribute in priority order (prefix table, then popular
//! searches, then top selling). Duplicate terms are removed
//! case-insensitively, first source wins, and the merged list is capped
//! at the configured maximum.

use crate::config::SuggestConfig;
use crate::models::{PopularSearch, Suggestion, SuggestionSource};
use crate::storage::SuggestionBackend;
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;
use tracing::instrument;

/// Number of suggestion sources consulted per call.
const SOURCE_COUNT: usize = 3;

/// Service merging query suggestions from multiple sources.
pub struct SuggestionService {
    /// Lookup backend shared with the spawned source threads.
    backend: Arc<dyn SuggestionBackend>,
    /// Tunables for limits and the source deadline.
    config: SuggestConfig,
}

impl SuggestionService {
    /// Creates a suggestion service with default tunables.
    #[must_use]
    pub fn new(backend: Arc<dyn SuggestionBackend>) -> Self {
        Self {
            backend,
            config: SuggestConfig::default(),
        }
    }

    /// Overrides the tunables.
    #[must_use]
    pub const fn with_config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns merged suggestions for a query fragment.
    ///
    /// Queries shorter than the configured minimum return nothing, as
    /// do queries where every source came back empty, failed, or timed
    /// out. This method never errors: suggestion lookups are an
    /// accessory to search, not a dependency of it.
    #[instrument(skip(self))]
    pub fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let fragment = query.trim().to_lowercase();
        if fragment.chars().count() < self.config.min_query_length {
            return Vec::new();
        }

        let collected = self.collect_sources(&fragment);
        self.merge(collected)
    }

    /// Returns the highest-counted popular search terms.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend lookup fails.
    pub fn popular(&self, limit: usize) -> Result<Vec<PopularSearch>> {
        self.backend.top_popular(limit)
    }

    /// Runs all source lookups on background threads and collects what
    /// arrives before the shared deadline.
    ///
    /// Threads that miss the deadline keep running to completion and
    /// send into a dropped channel; their work is discarded. Rust
    /// threads cannot be cancelled, and the lookups are short enough
    /// that letting them finish is cheaper than any teardown protocol.
    fn collect_sources(&self, fragment: &str) -> Vec<(SuggestionSource, Vec<String>)> {
        let (tx, rx) = mpsc::channel();
        let limit = self.config.per_source_limit;

        {
            let backend = Arc::clone(&self.backend);
            let fragment = fragment.to_string();
            let tx = tx.clone();
            std::thread::spawn(move || {
                let result = backend.prefix_suggestions(&fragment, limit);
                let _ = tx.send((SuggestionSource::PrefixTable, result));
            });
        }
        {
            let backend = Arc::clone(&self.backend);
            let fragment = fragment.to_string();
            let tx = tx.clone();
            std::thread::spawn(move || {
                let result = backend.popular_searches(&fragment, limit);
                let _ = tx.send((SuggestionSource::PopularSearches, result));
            });
        }
        {
            let backend = Arc::clone(&self.backend);
            let fragment = fragment.to_string();
            std::thread::spawn(move || {
                let result = backend.top_selling_titles(&fragment, limit);
                let _ = tx.send((SuggestionSource::TopSelling, result));
            });
        }

        let deadline = Instant::now() + self.config.source_timeout;
        let mut collected: Vec<(SuggestionSource, Vec<String>)> = Vec::with_capacity(SOURCE_COUNT);
        let mut answered = 0usize;

        while answered < SOURCE_COUNT {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok((source, Ok(terms))) => {
                    answered += 1;
                    metrics::counter!("suggest_source_completed", "status" => "success")
                        .increment(1);
                    collected.push((source, terms));
                },
                Ok((source, Err(error))) => {
                    answered += 1;
                    metrics::counter!("suggest_source_completed", "status" => "error").increment(1);
                    tracing::warn!(
                        source = source.as_str(),
                        error = %error,
                        "Suggestion source failed, omitting it"
                    );
                },
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        if answered < SOURCE_COUNT {
            let omitted = (SOURCE_COUNT - answered) as u64;
            metrics::counter!("suggest_source_timeout_total").increment(omitted);
            tracing::debug!(
                omitted = omitted,
                timeout = ?self.config.source_timeout,
                "Suggestion sources missed the deadline"
            );
        }
        collected
    }

    /// Merges source results by priority with case-insensitive dedupe.
    fn merge(&self, mut collected: Vec<(SuggestionSource, Vec<String>)>) -> Vec<Suggestion> {
        collected.sort_by_key(|(source, _)| *source);

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::new();
        for (source, terms) in collected {
            for term in terms {
                if term.trim().is_empty() {
                    continue;
                }
                if seen.insert(term.to_lowercase()) {
                    merged.push(Suggestion::new(term, source));
                    if merged.len() >= self.config.max_suggestions {
                        return merged;
                    }
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::time::Duration;

    /// Backend stub with per-source payloads, delays, and failures.
    #[derive(Default)]
    struct StubBackend {
        prefix: Vec<String>,
        popular: Vec<String>,
        selling: Vec<String>,
        delay: Option<(SuggestionSource, Duration)>,
        fail: Option<SuggestionSource>,
    }

    impl StubBackend {
        fn answer(&self, source: SuggestionSource, terms: &[String]) -> Result<Vec<String>> {
            if let Some((slow, delay)) = &self.delay
                && *slow == source
            {
                std::thread::sleep(*delay);
            }
            if self.fail == Some(source) {
                return Err(Error::RetrievalFailed {
                    operation: "stub".to_string(),
                    cause: "simulated failure".to_string(),
                });
            }
            Ok(terms.to_vec())
        }
    }

    impl SuggestionBackend for StubBackend {
        fn prefix_suggestions(&self, _prefix: &str, _limit: usize) -> Result<Vec<String>> {
            self.answer(SuggestionSource::PrefixTable, &self.prefix)
        }

        fn popular_searches(&self, _fragment: &str, _limit: usize) -> Result<Vec<String>> {
            self.answer(SuggestionSource::PopularSearches, &self.popular)
        }

        fn top_selling_titles(&self, _fragment: &str, _limit: usize) -> Result<Vec<String>> {
            self.answer(SuggestionSource::TopSelling, &self.selling)
        }

        fn top_popular(&self, limit: usize) -> Result<Vec<PopularSearch>> {
            Ok(self
                .popular
                .iter()
                .take(limit)
                .map(|term| PopularSearch {
                    term: term.clone(),
                    count: 7,
                })
                .collect())
        }
    }

    fn owned(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| (*t).to_string()).collect()
    }

    fn service(backend: StubBackend) -> SuggestionService {
        SuggestionService::new(Arc::new(backend))
    }

    #[test]
    fn test_sources_merge_in_priority_order() {
        let svc = service(StubBackend {
            prefix: owned(&["chaussures"]),
            popular: owned(&["chaussures homme"]),
            selling: owned(&["Chaussures Nike Air"]),
            ..StubBackend::default()
        });
        let suggestions = svc.suggest("chau");
        let terms: Vec<&str> = suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(
            terms,
            vec!["chaussures", "chaussures homme", "Chaussures Nike Air"]
        );
        assert_eq!(suggestions[0].source, SuggestionSource::PrefixTable);
        assert_eq!(suggestions[2].source, SuggestionSource::TopSelling);
    }

    #[test]
    fn test_duplicates_removed_case_insensitively() {
        let svc = service(StubBackend {
            prefix: owned(&["Chaussures"]),
            popular: owned(&["chaussures", "sandales"]),
            selling: owned(&["CHAUSSURES"]),
            ..StubBackend::default()
        });
        let suggestions = svc.suggest("chau");
        let terms: Vec<&str> = suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, vec!["Chaussures", "sandales"]);
    }

    #[test]
    fn test_merged_list_is_capped() {
        let many: Vec<String> = (0..8).map(|i| format!("prefix {i}")).collect();
        let more: Vec<String> = (0..8).map(|i| format!("popular {i}")).collect();
        let svc = service(StubBackend {
            prefix: many,
            popular: more,
            ..StubBackend::default()
        });
        let suggestions = svc.suggest("pre");
        assert_eq!(suggestions.len(), SuggestConfig::default().max_suggestions);
    }

    #[test]
    fn test_short_query_returns_nothing() {
        let svc = service(StubBackend {
            prefix: owned(&["chaussures"]),
            ..StubBackend::default()
        });
        assert!(svc.suggest("c").is_empty());
        assert!(svc.suggest("   ").is_empty());
    }

    #[test]
    fn test_slow_source_is_omitted() {
        let svc = service(StubBackend {
            prefix: owned(&["rapide"]),
            popular: owned(&["lent"]),
            selling: owned(&["aussi rapide"]),
            delay: Some((SuggestionSource::PopularSearches, Duration::from_millis(500))),
            ..StubBackend::default()
        })
        .with_config(SuggestConfig {
            source_timeout: Duration::from_millis(50),
            ..SuggestConfig::default()
        });

        let started = Instant::now();
        let suggestions = svc.suggest("ra");
        assert!(started.elapsed() < Duration::from_millis(400));

        let terms: Vec<&str> = suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, vec!["rapide", "aussi rapide"]);
    }

    #[test]
    fn test_failing_source_is_omitted() {
        let svc = service(StubBackend {
            prefix: owned(&["bon"]),
            popular: owned(&["casse"]),
            selling: owned(&["encore bon"]),
            fail: Some(SuggestionSource::PopularSearches),
            ..StubBackend::default()
        });
        let terms: Vec<String> = svc.suggest("bo").into_iter().map(|s| s.term).collect();
        assert_eq!(terms, vec!["bon", "encore bon"]);
    }

    #[test]
    fn test_popular_passthrough() {
        let svc = service(StubBackend {
            popular: owned(&["chaussures", "robe wax"]),
            ..StubBackend::default()
        });
        let popular = svc.popular(1).unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].term, "chaussures");
    }
}
