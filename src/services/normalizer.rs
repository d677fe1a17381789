//! Request normalization.
//!
//! Inbound parameters arrive either as untyped strings from a query
//! form or as a structured body. Normalization is total: malformed
//! values fall back to defaults, out-of-range values are clamped, and
//! reversed price bounds are swapped. A request is never rejected for
//! bad input, so every later stage can assume a well-formed
//! [`SearchRequest`] and skip validation entirely.

use crate::models::{
    AdvancedSearchBody, CategoryId, DEFAULT_LIMIT, DEFAULT_RADIUS_KM, GeoPoint, RawSearchParams,
    SearchRequest, ShopId, SortBy,
};

/// Normalizes flat string parameters into a canonical request.
#[must_use]
pub fn normalize(params: &RawSearchParams) -> SearchRequest {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut request = SearchRequest::new(query)
        .with_price_range(
            parse_price(params.min_price.as_deref()),
            parse_price(params.max_price.as_deref()),
        )
        .with_sort(parse_sort(params.sort.as_deref()))
        .with_page(parse_page(params.page.as_deref()))
        .with_limit(parse_limit(params.limit.as_deref()));

    request.category = opt_text(params.category.as_deref()).map(CategoryId::new);
    request.shop = opt_text(params.shop.as_deref()).map(ShopId::new);
    request.brand = opt_text(params.brand.as_deref());
    request.tags = parse_tags(params.tags.as_deref());
    request.in_stock = params.in_stock.as_deref().is_some_and(|v| v.trim() == "true");

    if let Some(location) = parse_location(params.lat.as_deref(), params.lng.as_deref()) {
        request = request.with_location(location, parse_radius(params.radius.as_deref()));
    }
    request
}

/// Normalizes a structured body into the same canonical request form.
#[must_use]
pub fn normalize_body(body: &AdvancedSearchBody) -> SearchRequest {
    let query = body
        .query
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let filters = body.filters.clone().unwrap_or_default();
    let (min_price, max_price) = filters
        .price
        .map_or((None, None), |p| (sane_price(p.min), sane_price(p.max)));
    let pagination = body.pagination.clone().unwrap_or_default();

    let mut request = SearchRequest::new(query)
        .with_price_range(min_price, max_price)
        .with_sort(parse_sort(body.sort.as_deref()))
        .with_page(pagination.page.unwrap_or(1))
        .with_limit(pagination.limit.unwrap_or(DEFAULT_LIMIT));

    request.category = opt_text(body.category.as_deref()).map(CategoryId::new);
    request.shop = opt_text(filters.shop.as_deref()).map(ShopId::new);
    request.brand = opt_text(filters.brand.as_deref());
    request.tags = filters
        .tags
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    request.in_stock = filters.in_stock.unwrap_or(false);

    if let Some(location) = body.location.filter(GeoPoint::is_valid) {
        let radius = body
            .radius
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_RADIUS_KM);
        request = request.with_location(location, radius);
    }
    request
}

/// Trimmed, non-empty text or nothing.
fn opt_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A price bound usable as a filter: finite and non-negative.
fn sane_price(value: Option<f64>) -> Option<f64> {
    value.filter(|p| p.is_finite() && *p >= 0.0)
}

fn parse_price(value: Option<&str>) -> Option<f64> {
    sane_price(value.and_then(|v| v.trim().parse::<f64>().ok()))
}

fn parse_sort(value: Option<&str>) -> SortBy {
    value.map(SortBy::parse).unwrap_or_default()
}

fn parse_page(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map_or(1, |page| page.max(1))
}

fn parse_limit(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT)
}

fn parse_tags(value: Option<&str>) -> Vec<String> {
    value
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_location(lat: Option<&str>, lng: Option<&str>) -> Option<GeoPoint> {
    let lat = lat.and_then(|v| v.trim().parse::<f64>().ok())?;
    let lng = lng.and_then(|v| v.trim().parse::<f64>().ok())?;
    Some(GeoPoint { lat, lng }).filter(GeoPoint::is_valid)
}

fn parse_radius(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_RADIUS_KM)
}
