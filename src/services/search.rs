//! The search pipeline service.
//!
//! [`SearchService`] owns the full flow for one search call:
//!
//! ```text
//! params --normalize--> request --fingerprint--> cache check
//!    (hit: return)     (miss: continue)
//!        |
//!        v
//!  retrieve (structured filters at the store)
//!        |
//!        v
//!  geo filter ---> fuzzy rank ---> facets ---> sort + paginate
//!   (optional)    (query only)  (pre-page)
//!        |
//!        v
//!  response --> cache store --> Executed event on the bus
//! ```
//!
//! The retriever is the only collaborator whose failure fails a search.
//! Cache, suggestions, and the event bus are optional attachments: each
//! is skipped when absent and absorbed when broken, so degraded
//! deployments serve slower but correct results.

use crate::config::EngineConfig;
use crate::models::{
    AdvancedSearchBody, AppliedFilters, AutocompleteEntry, ProductId, RawSearchParams,
    ScoredProduct, SearchEvent, SearchRequest, SearchResponse, ShopHit, ShopSearchResponse,
};
use crate::observability::EventBus;
use crate::services::facets::compute_facets;
use crate::services::fuzzy::FuzzyRanker;
use crate::services::geo::GeoFilter;
use crate::services::normalizer;
use crate::services::sort::{SortStrategy, paginate};
use crate::services::suggest::SuggestionService;
use crate::storage::{ProductRetriever, ResultCache, ShopRetriever};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Key prefix for cached search responses.
const SEARCH_KEY_PREFIX: &str = "search:";
/// Key prefix for cached autocomplete responses.
const AUTOCOMPLETE_KEY_PREFIX: &str = "autocomplete:";
/// Fixed autocomplete result count.
const AUTOCOMPLETE_LIMIT: usize = 10;
/// Minimum fragment length before autocomplete hits the store.
const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// Orchestrates search execution over pluggable collaborators.
pub struct SearchService {
    /// Candidate store. The one mandatory collaborator.
    retriever: Arc<dyn ProductRetriever>,
    /// Fuzzy ranker, rebuilt whenever the config changes.
    ranker: FuzzyRanker,
    /// Engine tunables.
    config: EngineConfig,
    /// Optional response cache.
    cache: Option<Arc<dyn ResultCache>>,
    /// Optional suggestion engine for the response's suggestion list.
    suggestions: Option<Arc<SuggestionService>>,
    /// Optional shop store for shop search.
    shops: Option<Arc<dyn ShopRetriever>>,
    /// Optional analytics bus.
    event_bus: Option<EventBus>,
}

impl SearchService {
    /// Creates a search service over the given product store.
    #[must_use]
    pub fn new(retriever: Arc<dyn ProductRetriever>) -> Self {
        Self {
            retriever,
            ranker: FuzzyRanker::new(),
            config: EngineConfig::default(),
            cache: None,
            suggestions: None,
            shops: None,
            event_bus: None,
        }
    }

    /// Replaces the engine tunables.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.ranker = FuzzyRanker::with_config(config.fuzzy);
        self.config = config;
        self
    }

    /// Attaches a result cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attaches a suggestion engine.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Arc<SuggestionService>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    /// Attaches a shop store, enabling [`SearchService::search_shops`].
    #[must_use]
    pub fn with_shops(mut self, shops: Arc<dyn ShopRetriever>) -> Self {
        self.shops = Some(shops);
        self
    }

    /// Attaches an event bus for analytics publication.
    #[must_use]
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Runs a search from flat string parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetrievalFailed`] when the store cannot serve
    /// candidates. Malformed parameters never error; they normalize to
    /// defaults.
    pub fn search(&self, params: &RawSearchParams) -> Result<SearchResponse> {
        self.execute(&normalizer::normalize(params))
    }

    /// Runs a search from a structured advanced-search body.
    ///
    /// # Errors
    ///
    /// Same contract as [`SearchService::search`]; both forms normalize
    /// to the same request type.
    pub fn search_advanced(&self, body: &AdvancedSearchBody) -> Result<SearchResponse> {
        self.execute(&normalizer::normalize_body(body))
    }

    /// Runs the pipeline for an already-normalized request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetrievalFailed`] when the store cannot serve
    /// candidates.
    #[instrument(
        skip(self, request),
        fields(query = %request.query, page = request.page, sort = request.sort_by.as_str())
    )]
    pub fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let cache_key = format!("{SEARCH_KEY_PREFIX}{}", request.fingerprint());

        if let Some(response) = self.cache_get::<SearchResponse>(&cache_key) {
            metrics::counter!("search_cache_hits_total").increment(1);
            tracing::debug!("Serving search response from cache");
            return Ok(response);
        }
        if self.cache.is_some() {
            metrics::counter!("search_cache_misses_total").increment(1);
        }

        let filters = request.structured_filters();
        let candidates = self.retriever.retrieve(&filters)?;
        #[allow(clippy::cast_precision_loss)]
        metrics::histogram!("search_candidates").record(candidates.len() as f64);

        let mut results: Vec<ScoredProduct> =
            candidates.into_iter().map(ScoredProduct::from).collect();

        if let Some(geo) = GeoFilter::from_request(request) {
            results = geo.apply(results);
        }
        if request.has_query() {
            results = self.ranker.rank(&request.query, results);
        }

        let facets = compute_facets(&results);
        SortStrategy::for_order(request.sort_by).apply(&mut results);
        let total = results.len();
        let (products, pagination) = paginate(results, request.page, request.limit);

        let response = SearchResponse {
            products,
            pagination,
            filters: AppliedFilters::from(request),
            suggestions: self.suggestion_terms(&request.query),
            facets,
        };

        self.cache_put(&cache_key, &response, self.config.cache.search_ttl);
        self.publish_executed(request, total);

        metrics::histogram!("search_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::debug!(
            total = total,
            served = response.products.len(),
            "Search complete"
        );
        Ok(response)
    }

    /// Title-prefix typeahead over active products.
    ///
    /// Fragments under two characters return nothing. Results are
    /// cached under the lowercased fragment with a short TTL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetrievalFailed`] when the store lookup fails.
    #[instrument(skip(self))]
    pub fn autocomplete(&self, query: &str) -> Result<Vec<AutocompleteEntry>> {
        let fragment = query.trim().to_lowercase();
        if fragment.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Ok(Vec::new());
        }

        let cache_key = format!("{AUTOCOMPLETE_KEY_PREFIX}{fragment}");
        if let Some(entries) = self.cache_get::<Vec<AutocompleteEntry>>(&cache_key) {
            metrics::counter!("autocomplete_cache_hits_total").increment(1);
            return Ok(entries);
        }

        let entries: Vec<AutocompleteEntry> = self
            .retriever
            .title_prefix(&fragment, AUTOCOMPLETE_LIMIT)?
            .into_iter()
            .map(|product| AutocompleteEntry {
                id: product.id,
                title: product.title,
                price: product.price,
            })
            .collect();

        self.cache_put(&cache_key, &entries, self.config.cache.autocomplete_ttl);
        Ok(entries)
    }

    /// Searches shops by name or description, distance-annotated when
    /// the parameters carry a location.
    ///
    /// Shops without coordinates survive a located search with a null
    /// distance and sort after every located shop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetrievalFailed`] when no shop store is attached
    /// or the lookup fails.
    #[instrument(skip(self, params))]
    pub fn search_shops(&self, params: &RawSearchParams) -> Result<ShopSearchResponse> {
        let Some(shops) = self.shops.as_ref() else {
            return Err(Error::RetrievalFailed {
                operation: "search_shops".to_string(),
                cause: "no shop retriever attached".to_string(),
            });
        };

        let request = normalizer::normalize(params);
        let found = shops.search_shops(&request.query)?;
        let hits: Vec<ShopHit> = match GeoFilter::from_request(&request) {
            Some(geo) => geo.filter_shops(found),
            None => found
                .into_iter()
                .map(|shop| ShopHit {
                    shop,
                    distance: None,
                })
                .collect(),
        };

        let total = hits.len();
        tracing::debug!(total = total, "Shop search complete");
        Ok(ShopSearchResponse { shops: hits, total })
    }

    /// Records a click-through on a search result.
    ///
    /// Fire-and-forget: without an event bus this is a no-op, and a full
    /// bus drops the event rather than blocking.
    pub fn track_click(&self, product_id: &ProductId, query: &str) {
        let Some(bus) = self.event_bus.as_ref() else {
            return;
        };
        bus.publish(SearchEvent::ResultClicked {
            product_id: product_id.clone(),
            query: query.trim().to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Reads and decodes a cached value, absorbing every failure mode.
    fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.get(key) {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(error) => {
                    // Entry written by an older schema; treat as a miss
                    // and let the rewrite below replace it.
                    tracing::debug!(key = key, error = %error, "Discarding undecodable cache entry");
                    None
                },
            },
            Ok(None) => None,
            Err(error) => {
                metrics::counter!("search_cache_errors_total", "operation" => "get").increment(1);
                tracing::warn!(key = key, error = %error, "Cache read failed, continuing without");
                None
            },
        }
    }

    /// Encodes and stores a value, absorbing every failure mode.
    fn cache_put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        match serde_json::to_string(value) {
            Ok(payload) => {
                if let Err(error) = cache.set_with_ttl(key, &payload, ttl) {
                    metrics::counter!("search_cache_errors_total", "operation" => "set")
                        .increment(1);
                    tracing::warn!(key = key, error = %error, "Cache write failed, serving uncached");
                }
            },
            Err(error) => {
                tracing::warn!(key = key, error = %error, "Response not serializable for cache");
            },
        }
    }

    /// Collects suggestion terms for the response, if a service is wired.
    fn suggestion_terms(&self, query: &str) -> Vec<String> {
        self.suggestions
            .as_ref()
            .map(|service| {
                service
                    .suggest(query)
                    .into_iter()
                    .map(|suggestion| suggestion.term)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Publishes the Executed event, if a bus is wired.
    fn publish_executed(&self, request: &SearchRequest, result_count: usize) {
        let Some(bus) = self.event_bus.as_ref() else {
            return;
        };
        bus.publish(SearchEvent::Executed {
            query: request.query.clone(),
            filters: AppliedFilters::from(request),
            result_count,
            timestamp: Utc::now(),
        });
    }
}
