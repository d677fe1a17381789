//! Facet aggregation over the full filtered result set.
//!
//! Facets are computed before pagination so counts describe everything
//! the query matched, not just the visible page. Category, brand, and
//! shop counters are keyed by display name in sorted order; price
//! counts fall into the four fixed marketplace buckets.

use crate::models::{FacetSet, ScoredProduct};

/// Aggregates facet counts over ranked, pre-pagination results.
#[must_use]
pub fn compute_facets(products: &[ScoredProduct]) -> FacetSet {
    let mut facets = FacetSet::default();
    for item in products {
        let product = &item.product;
        *facets
            .categories
            .entry(product.category.name.clone())
            .or_insert(0) += 1;
        if let Some(brand) = &product.brand
            && !brand.is_empty()
        {
            *facets.brands.entry(brand.clone()).or_insert(0) += 1;
        }
        *facets.shops.entry(product.shop.name.clone()).or_insert(0) += 1;
        facets.price_ranges.add(product.price);
        if product.stock > 0 {
            facets.in_stock += 1;
        }
    }
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CategoryId, CategoryRef, ListingStatus, Product, ProductId, ShopId, ShopRef,
    };
    use chrono::Utc;

    fn item(id: &str, category: &str, brand: Option<&str>, price: f64, stock: u32) -> ScoredProduct {
        ScoredProduct::from(Product {
            id: ProductId::new(id),
            title: format!("Produit {id}"),
            description: String::new(),
            brand: brand.map(str::to_string),
            tags: Vec::new(),
            category: CategoryRef {
                id: CategoryId::new(category.to_lowercase()),
                name: category.to_string(),
            },
            shop: ShopRef {
                id: ShopId::new("shop-1"),
                name: "Boutique Cotonou".to_string(),
                location: None,
            },
            price,
            stock,
            created_at: Utc::now(),
            views: 0,
            sales_count: 0,
            status: ListingStatus::Active,
        })
    }

    #[test]
    fn test_counts_by_category_brand_and_shop() {
        let items = vec![
            item("p1", "Mode", Some("Wax"), 5_000.0, 2),
            item("p2", "Mode", Some("Wax"), 25_000.0, 0),
            item("p3", "Electronique", Some("Samsung"), 120_000.0, 1),
        ];
        let facets = compute_facets(&items);

        assert_eq!(facets.categories.get("Mode"), Some(&2));
        assert_eq!(facets.categories.get("Electronique"), Some(&1));
        assert_eq!(facets.brands.get("Wax"), Some(&2));
        assert_eq!(facets.brands.get("Samsung"), Some(&1));
        assert_eq!(facets.shops.get("Boutique Cotonou"), Some(&3));
        assert_eq!(facets.in_stock, 2);
    }

    #[test]
    fn test_price_buckets() {
        let items = vec![
            item("p1", "Mode", None, 9_999.0, 1),
            item("p2", "Mode", None, 10_000.0, 1),
            item("p3", "Mode", None, 75_000.0, 1),
            item("p4", "Mode", None, 250_000.0, 1),
        ];
        let facets = compute_facets(&items);

        assert_eq!(facets.price_ranges.up_to_10k, 1);
        assert_eq!(facets.price_ranges.up_to_50k, 1);
        assert_eq!(facets.price_ranges.up_to_100k, 1);
        assert_eq!(facets.price_ranges.over_100k, 1);
        assert_eq!(facets.price_ranges.total(), 4);
    }

    #[test]
    fn test_missing_brand_not_counted() {
        let items = vec![item("p1", "Mode", None, 5_000.0, 1)];
        let facets = compute_facets(&items);
        assert!(facets.brands.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_facets() {
        let facets = compute_facets(&[]);
        assert!(facets.categories.is_empty());
        assert!(facets.brands.is_empty());
        assert!(facets.shops.is_empty());
        assert_eq!(facets.price_ranges.total(), 0);
        assert_eq!(facets.in_stock, 0);
    }
}
