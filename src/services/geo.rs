//! Geographic distance filtering for search results.
//!
//! Distances are great-circle kilometres computed with the haversine
//! formula. Products inherit their shop's coordinates; a product whose
//! shop has no stored location cannot be placed on the map and is
//! dropped from location-constrained searches. Shop searches are more
//! forgiving: shops without coordinates are kept with a `null` distance
//! and sorted after every located shop.

use crate::models::{GeoPoint, ScoredProduct, SearchRequest, Shop, ShopHit};
use std::cmp::Ordering;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Computes the great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Radius filter anchored at the caller's location.
#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    /// Anchor point, already range-checked by the normalizer.
    origin: GeoPoint,
    /// Inclusive radius in kilometres.
    radius_km: f64,
}

impl GeoFilter {
    /// Creates a filter around `origin` with the given radius.
    #[must_use]
    pub const fn new(origin: GeoPoint, radius_km: f64) -> Self {
        Self { origin, radius_km }
    }

    /// Builds a filter from a normalized request, if it carries a location.
    #[must_use]
    pub fn from_request(request: &SearchRequest) -> Option<Self> {
        request
            .user_location
            .filter(GeoPoint::is_valid)
            .map(|origin| Self::new(origin, request.radius_km))
    }

    /// Distance from the anchor to `point` in kilometres.
    #[must_use]
    pub fn distance_to(&self, point: GeoPoint) -> f64 {
        haversine_km(self.origin, point)
    }

    /// Annotates each candidate with its shop distance and keeps only
    /// those within the radius.
    ///
    /// Candidates whose shop has no stored coordinates are removed: a
    /// location-constrained search can only return placeable results.
    #[must_use]
    pub fn apply(&self, candidates: Vec<ScoredProduct>) -> Vec<ScoredProduct> {
        let before = candidates.len();
        let kept: Vec<ScoredProduct> = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                let location = candidate.product.shop.location?;
                let distance = self.distance_to(location);
                if distance <= self.radius_km {
                    candidate.distance_km = Some(distance);
                    Some(candidate)
                } else {
                    None
                }
            })
            .collect();

        metrics::counter!("search_geo_dropped_total").increment((before - kept.len()) as u64);
        tracing::debug!(
            before = before,
            kept = kept.len(),
            radius_km = self.radius_km,
            "Applied geographic filter"
        );
        kept
    }

    /// Annotates shops with their distance and keeps those in range.
    ///
    /// Unlike [`GeoFilter::apply`], shops without coordinates survive
    /// the filter with a `null` distance and sort after located shops.
    #[must_use]
    pub fn filter_shops(&self, shops: Vec<Shop>) -> Vec<ShopHit> {
        let mut hits: Vec<ShopHit> = shops
            .into_iter()
            .filter_map(|shop| {
                let distance = shop.location.map(|location| self.distance_to(location));
                match distance {
                    Some(d) if d > self.radius_km => None,
                    _ => Some(ShopHit { shop, distance }),
                }
            })
            .collect();
        sort_shop_hits(&mut hits);
        hits
    }
}

/// Orders shop hits nearest-first, unlocated shops last, ties by id.
pub fn sort_shop_hits(hits: &mut [ShopHit]) {
    hits.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(da), Some(db)) => da.total_cmp(&db).then_with(|| a.shop.id.cmp(&b.shop.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.shop.id.cmp(&b.shop.id),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRef, ListingStatus, Product, ProductId, ShopId, ShopRef};
    use chrono::Utc;

    // Cotonou and Porto-Novo are roughly 30 km apart.
    const COTONOU: GeoPoint = GeoPoint {
        lat: 6.3703,
        lng: 2.3912,
    };
    const PORTO_NOVO: GeoPoint = GeoPoint {
        lat: 6.4969,
        lng: 2.6283,
    };

    fn product_at(id: &str, location: Option<GeoPoint>) -> ScoredProduct {
        ScoredProduct::from(Product {
            id: ProductId::new(id),
            title: "Chaussures de sport".to_string(),
            description: String::new(),
            brand: None,
            tags: Vec::new(),
            category: CategoryRef {
                id: crate::models::CategoryId::new("mode"),
                name: "Mode".to_string(),
            },
            shop: ShopRef {
                id: ShopId::new("shop-1"),
                name: "Boutique".to_string(),
                location,
            },
            price: 15_000.0,
            stock: 3,
            created_at: Utc::now(),
            views: 0,
            sales_count: 0,
            status: ListingStatus::Active,
        })
    }

    fn shop_at(id: &str, location: Option<GeoPoint>) -> Shop {
        Shop {
            id: ShopId::new(id),
            name: format!("Shop {id}"),
            description: String::new(),
            location,
            status: ListingStatus::Active,
        }
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert!(haversine_km(COTONOU, COTONOU) < 1e-9);
    }

    #[test]
    fn test_haversine_cotonou_porto_novo() {
        let d = haversine_km(COTONOU, PORTO_NOVO);
        assert!(d > 25.0 && d < 35.0, "unexpected distance: {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let ab = haversine_km(COTONOU, PORTO_NOVO);
        let ba = haversine_km(PORTO_NOVO, COTONOU);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_apply_keeps_products_within_radius() {
        let filter = GeoFilter::new(COTONOU, 50.0);
        let kept = filter.apply(vec![product_at("p1", Some(PORTO_NOVO))]);
        assert_eq!(kept.len(), 1);
        let distance = kept[0].distance_km.unwrap();
        assert!(distance > 25.0 && distance < 35.0);
    }

    #[test]
    fn test_apply_drops_products_outside_radius() {
        let filter = GeoFilter::new(COTONOU, 10.0);
        let kept = filter.apply(vec![product_at("p1", Some(PORTO_NOVO))]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_apply_keeps_products_exactly_at_radius() {
        // The cutoff is inclusive.
        let exact = haversine_km(COTONOU, PORTO_NOVO);
        let filter = GeoFilter::new(COTONOU, exact);
        let kept = filter.apply(vec![product_at("p1", Some(PORTO_NOVO))]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_apply_drops_products_without_coordinates() {
        let filter = GeoFilter::new(COTONOU, 10.0);
        let kept = filter.apply(vec![product_at("p1", None), product_at("p2", Some(COTONOU))]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].product.id.as_str(), "p2");
    }

    #[test]
    fn test_filter_shops_keeps_unlocated_last() {
        let filter = GeoFilter::new(COTONOU, 50.0);
        let hits = filter.filter_shops(vec![
            shop_at("s-none", None),
            shop_at("s-far", Some(PORTO_NOVO)),
            shop_at("s-near", Some(COTONOU)),
        ]);
        let ids: Vec<&str> = hits.iter().map(|h| h.shop.id.as_str()).collect();
        assert_eq!(ids, vec!["s-near", "s-far", "s-none"]);
        assert!(hits[2].distance.is_none());
    }

    #[test]
    fn test_filter_shops_drops_located_outside_radius() {
        let filter = GeoFilter::new(COTONOU, 5.0);
        let hits = filter.filter_shops(vec![
            shop_at("s-far", Some(PORTO_NOVO)),
            shop_at("s-none", None),
        ]);
        let ids: Vec<&str> = hits.iter().map(|h| h.shop.id.as_str()).collect();
        assert_eq!(ids, vec!["s-none"]);
    }

    #[test]
    fn test_from_request_requires_location() {
        let request = SearchRequest::new("chaussures");
        assert!(GeoFilter::from_request(&request).is_none());

        let located = request.with_location(COTONOU, 25.0);
        let filter = GeoFilter::from_request(&located).unwrap();
        assert!(filter.distance_to(COTONOU) < 1e-9);
    }
}
