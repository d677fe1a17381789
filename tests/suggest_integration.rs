//! Suggestion service integration tests.
//!
//! Drives [`SuggestionService`] over the real in-memory backend so the
//! merge, dedupe, and per-source limits are exercised against actual
//! curated entries, live search counters, and catalog titles rather
//! than stubs.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::Utc;
use soko::config::SuggestConfig;
use soko::models::{
    CategoryId, CategoryRef, ListingStatus, Product, ProductId, ShopId, ShopRef, SuggestionSource,
};
use soko::storage::{CatalogFile, InMemoryCatalog, InMemorySuggestions, PopularTerms, SuggestionEntry};
use soko::SuggestionService;
use std::sync::Arc;

fn product(id: &str, title: &str, sales: u64) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        description: String::new(),
        brand: None,
        tags: Vec::new(),
        category: CategoryRef {
            id: CategoryId::new("mode"),
            name: "Mode".to_string(),
        },
        shop: ShopRef {
            id: ShopId::new("shop-1"),
            name: "Boutique Cotonou".to_string(),
            location: None,
        },
        price: 10_000.0,
        stock: 5,
        created_at: Utc::now(),
        views: 0,
        sales_count: sales,
        status: ListingStatus::Active,
    }
}

fn entry(term: &str, weight: u32) -> SuggestionEntry {
    SuggestionEntry {
        term: term.to_string(),
        weight,
    }
}

fn service(
    products: Vec<Product>,
    entries: Vec<SuggestionEntry>,
    popular: PopularTerms,
) -> SuggestionService {
    let catalog = Arc::new(InMemoryCatalog::new(products, Vec::new()));
    SuggestionService::new(Arc::new(InMemorySuggestions::new(catalog, entries, popular)))
}

fn terms(suggestions: &[soko::Suggestion]) -> Vec<&str> {
    suggestions.iter().map(|s| s.term.as_str()).collect()
}

#[test]
fn test_all_three_sources_contribute_in_priority_order() {
    let popular = PopularTerms::new();
    popular.increment("robe de soiree");

    let svc = service(
        vec![product("p1", "Robe wax imprimee", 20)],
        vec![entry("robe enfant", 5)],
        popular,
    );

    let suggestions = svc.suggest("robe");
    assert_eq!(
        terms(&suggestions),
        vec!["robe enfant", "robe de soiree", "Robe wax imprimee"]
    );
    assert_eq!(suggestions[0].source, SuggestionSource::PrefixTable);
    assert_eq!(suggestions[1].source, SuggestionSource::PopularSearches);
    assert_eq!(suggestions[2].source, SuggestionSource::TopSelling);
}

#[test]
fn test_term_shared_across_sources_keeps_curated_casing() {
    let popular = PopularTerms::new();
    popular.increment("robe wax");

    let svc = service(
        vec![product("p1", "Robe wax", 20)],
        vec![entry("Robe Wax", 5)],
        popular,
    );

    let suggestions = svc.suggest("robe");
    assert_eq!(terms(&suggestions), vec!["Robe Wax"]);
    assert_eq!(suggestions[0].source, SuggestionSource::PrefixTable);
}

#[test]
fn test_live_search_counts_order_the_popular_source() {
    let popular = PopularTerms::new();
    popular.increment("robe wax");
    for _ in 0..3 {
        popular.increment("robe pagne");
    }

    let svc = service(Vec::new(), Vec::new(), popular);

    let suggestions = svc.suggest("robe");
    assert_eq!(terms(&suggestions), vec!["robe pagne", "robe wax"]);
}

#[test]
fn test_per_source_limit_caps_each_source_independently() {
    let svc = service(
        Vec::new(),
        vec![
            entry("chaussures femme", 9),
            entry("chaussures homme", 7),
            entry("chaussures enfant", 4),
            entry("chaussures sport", 2),
        ],
        PopularTerms::new(),
    )
    .with_config(SuggestConfig {
        per_source_limit: 2,
        ..SuggestConfig::default()
    });

    let suggestions = svc.suggest("chaussures");
    // Highest-weighted curated entries only.
    assert_eq!(
        terms(&suggestions),
        vec!["chaussures femme", "chaussures homme"]
    );
}

#[test]
fn test_merged_list_honors_the_global_cap() {
    let popular = PopularTerms::new();
    popular.increment("sac a main");
    popular.increment("sac de voyage");

    let svc = service(
        vec![product("p1", "Sac en cuir", 10), product("p2", "Sacoche", 5)],
        vec![entry("sac femme", 3), entry("sac ecole", 2)],
        popular,
    )
    .with_config(SuggestConfig {
        max_suggestions: 4,
        ..SuggestConfig::default()
    });

    let suggestions = svc.suggest("sac");
    assert_eq!(suggestions.len(), 4);
    // The lowest-priority source is the one that gets squeezed out.
    assert!(
        suggestions
            .iter()
            .all(|s| s.source != SuggestionSource::TopSelling)
    );
}

#[test]
fn test_popular_surface_reports_descending_counts() {
    let popular = PopularTerms::new();
    for _ in 0..5 {
        popular.increment("chaussures");
    }
    popular.increment("robe");

    let svc = service(Vec::new(), Vec::new(), popular);

    let top = svc.popular(2).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].term, "chaussures");
    assert_eq!(top[0].count, 5);
    assert_eq!(top[1].term, "robe");
    assert_eq!(top[1].count, 1);
}

#[test]
fn test_catalog_file_feeds_curated_and_selling_sources() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"{
            "products": [
                {
                    "id": "p-1",
                    "title": "Tissu wax hollandais",
                    "category": {"id": "mode", "name": "Mode"},
                    "shop": {"id": "s-1", "name": "Boutique Cotonou"},
                    "price": 15000,
                    "created_at": "2026-04-02T09:00:00Z",
                    "sales_count": 44
                }
            ],
            "suggestions": [
                {"term": "tissu pagne", "weight": 8}
            ]
        }"#,
    )
    .unwrap();

    let file = CatalogFile::load(&path).unwrap();
    let catalog = Arc::new(InMemoryCatalog::new(file.products, file.shops));
    let backend = InMemorySuggestions::new(catalog, file.suggestions, PopularTerms::new());
    let svc = SuggestionService::new(Arc::new(backend));

    let suggestions = svc.suggest("tissu");
    assert_eq!(
        terms(&suggestions),
        vec!["tissu pagne", "Tissu wax hollandais"]
    );
}

#[test]
fn test_blank_and_short_fragments_stay_silent() {
    let svc = service(
        vec![product("p1", "Montre doree", 3)],
        vec![entry("montre", 1)],
        PopularTerms::new(),
    );

    assert!(svc.suggest("m").is_empty());
    assert!(svc.suggest("  ").is_empty());
    assert!(svc.suggest("").is_empty());
}
