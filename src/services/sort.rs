//! Result ordering and pagination.
//!
//! Each [`SortBy`] value maps to exactly one [`SortStrategy`] variant
//! owning its comparator, so adding an order means adding a variant and
//! the match arms here. Every comparator except relevance breaks ties
//! by product id ascending to keep page boundaries stable across runs;
//! relevance relies on a stable sort so equal scores keep retrieval
//! order.

use crate::models::{Pagination, ScoredProduct, SortBy};
use std::cmp::Ordering;

/// Comparator-carrying counterpart of [`SortBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Fuzzy relevance, best first. Unscored results keep score zero.
    Relevance,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Most recently listed first.
    Newest,
    /// Highest popularity score first.
    Popular,
    /// Nearest first; results without a distance go last.
    Distance,
}

impl SortStrategy {
    /// Maps a requested order to its strategy.
    #[must_use]
    pub const fn for_order(order: SortBy) -> Self {
        match order {
            SortBy::Relevance => Self::Relevance,
            SortBy::PriceAsc => Self::PriceAsc,
            SortBy::PriceDesc => Self::PriceDesc,
            SortBy::Newest => Self::Newest,
            SortBy::Popular => Self::Popular,
            SortBy::Distance => Self::Distance,
        }
    }

    /// Sorts `items` in place according to this strategy.
    pub fn apply(self, items: &mut [ScoredProduct]) {
        // Stable sort throughout: relevance ties must keep retrieval
        // order, and the others are made deterministic by the id
        // tie-break anyway.
        items.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(self, a: &ScoredProduct, b: &ScoredProduct) -> Ordering {
        match self {
            Self::Relevance => b.relevance_or_zero().total_cmp(&a.relevance_or_zero()),
            Self::PriceAsc => a
                .product
                .price
                .total_cmp(&b.product.price)
                .then_with(|| a.product.id.cmp(&b.product.id)),
            Self::PriceDesc => b
                .product
                .price
                .total_cmp(&a.product.price)
                .then_with(|| a.product.id.cmp(&b.product.id)),
            Self::Newest => b
                .product
                .created_at
                .cmp(&a.product.created_at)
                .then_with(|| a.product.id.cmp(&b.product.id)),
            Self::Popular => b
                .product
                .popularity()
                .cmp(&a.product.popularity())
                .then_with(|| a.product.id.cmp(&b.product.id)),
            Self::Distance => match (a.distance_km, b.distance_km) {
                (Some(da), Some(db)) => da
                    .total_cmp(&db)
                    .then_with(|| a.product.id.cmp(&b.product.id)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.product.id.cmp(&b.product.id),
            },
        }
    }
}

impl From<SortBy> for SortStrategy {
    fn from(order: SortBy) -> Self {
        Self::for_order(order)
    }
}

/// Slices one page out of the full ordered result set.
///
/// `page` is 1-based and already clamped by the normalizer. A page past
/// the end yields an empty slice with truthful totals, never an error.
#[must_use]
pub fn paginate(items: Vec<ScoredProduct>, page: u32, limit: usize) -> (Vec<ScoredProduct>, Pagination) {
    let total = items.len();
    let pagination = Pagination::new(page, limit, total);
    #[allow(clippy::cast_possible_truncation)]
    let start = ((page.max(1) - 1) as usize).saturating_mul(limit);
    let page_items = if start >= total {
        Vec::new()
    } else {
        items.into_iter().skip(start).take(limit).collect()
    };
    (page_items, pagination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CategoryId, CategoryRef, ListingStatus, Product, ProductId, ShopId, ShopRef,
    };
    use chrono::{Duration, Utc};

    fn scored(id: &str, price: f64, relevance: Option<f32>) -> ScoredProduct {
        let mut item = ScoredProduct::from(Product {
            id: ProductId::new(id),
            title: format!("Produit {id}"),
            description: String::new(),
            brand: None,
            tags: Vec::new(),
            category: CategoryRef {
                id: CategoryId::new("mode"),
                name: "Mode".to_string(),
            },
            shop: ShopRef {
                id: ShopId::new("shop-1"),
                name: "Boutique".to_string(),
                location: None,
            },
            price,
            stock: 1,
            created_at: Utc::now(),
            views: 0,
            sales_count: 0,
            status: ListingStatus::Active,
        });
        item.relevance_score = relevance;
        item
    }

    fn ids(items: &[ScoredProduct]) -> Vec<&str> {
        items.iter().map(|i| i.product.id.as_str()).collect()
    }

    #[test]
    fn test_relevance_descending_stable_on_ties() {
        let mut items = vec![
            scored("p1", 100.0, Some(0.5)),
            scored("p2", 100.0, Some(0.9)),
            scored("p3", 100.0, Some(0.5)),
        ];
        SortStrategy::Relevance.apply(&mut items);
        assert_eq!(ids(&items), vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_relevance_treats_unscored_as_zero() {
        let mut items = vec![scored("p1", 100.0, None), scored("p2", 100.0, Some(0.1))];
        SortStrategy::Relevance.apply(&mut items);
        assert_eq!(ids(&items), vec!["p2", "p1"]);
    }

    #[test]
    fn test_price_asc_ties_break_by_id() {
        let mut items = vec![
            scored("p3", 500.0, None),
            scored("p1", 500.0, None),
            scored("p2", 200.0, None),
        ];
        SortStrategy::PriceAsc.apply(&mut items);
        assert_eq!(ids(&items), vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_price_desc() {
        let mut items = vec![scored("p1", 200.0, None), scored("p2", 900.0, None)];
        SortStrategy::PriceDesc.apply(&mut items);
        assert_eq!(ids(&items), vec!["p2", "p1"]);
    }

    #[test]
    fn test_newest_first() {
        let now = Utc::now();
        let mut old = scored("p-old", 100.0, None);
        old.product.created_at = now - Duration::days(30);
        let mut fresh = scored("p-new", 100.0, None);
        fresh.product.created_at = now;
        let mut items = vec![old, fresh];
        SortStrategy::Newest.apply(&mut items);
        assert_eq!(ids(&items), vec!["p-new", "p-old"]);
    }

    #[test]
    fn test_popular_weights_sales_over_views() {
        let mut viewed = scored("p-viewed", 100.0, None);
        viewed.product.views = 50;
        let mut sold = scored("p-sold", 100.0, None);
        sold.product.sales_count = 6;
        let mut items = vec![viewed, sold];
        SortStrategy::Popular.apply(&mut items);
        assert_eq!(ids(&items), vec!["p-sold", "p-viewed"]);
    }

    #[test]
    fn test_distance_missing_goes_last() {
        let mut near = scored("p-near", 100.0, None);
        near.distance_km = Some(2.0);
        let mut far = scored("p-far", 100.0, None);
        far.distance_km = Some(8.5);
        let unknown = scored("p-unknown", 100.0, None);
        let mut items = vec![unknown, far, near];
        SortStrategy::Distance.apply(&mut items);
        assert_eq!(ids(&items), vec!["p-near", "p-far", "p-unknown"]);
    }

    #[test]
    fn test_paginate_slices_requested_page() {
        let items: Vec<ScoredProduct> =
            (1..=5).map(|i| scored(&format!("p{i}"), 100.0, None)).collect();
        let (page, pagination) = paginate(items, 2, 2);
        assert_eq!(ids(&page), vec!["p3", "p4"]);
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.total, 5);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_more);
    }

    #[test]
    fn test_paginate_past_end_is_empty_with_truthful_totals() {
        let items = vec![scored("p1", 100.0, None)];
        let (page, pagination) = paginate(items, 9, 20);
        assert!(page.is_empty());
        assert_eq!(pagination.total, 1);
        assert_eq!(pagination.total_pages, 1);
        assert!(!pagination.has_more);
    }

    #[test]
    fn test_paginate_empty_set() {
        let (page, pagination) = paginate(Vec::new(), 1, 20);
        assert!(page.is_empty());
        assert_eq!(pagination.total, 0);
        assert_eq!(pagination.total_pages, 0);
        assert!(!pagination.has_more);
    }
}
