//! Listing search.
//!
//! GET and POST resolve to the same pipeline as the listings grid; they
//! answer in the full-record shape. Nearby search, suggestions and stats are
//! the remaining thin mappings.

use axum::extract::{Extension, Query};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::common::PageRequest;
use crate::domains::listings::{
    effective_price, pipeline, Listing, ListingPage, ListingSearch,
};
use crate::kernel::{collections, StoreQuery};
use crate::server::app::AppState;
use crate::server::error::ApiResult;

/// Search results default to smaller pages than the listings grid.
const SEARCH_PAGE_SIZE: u32 = 20;

/// Property types offered as suggestions.
const PROPERTY_TYPES: [&str; 8] = [
    "Apartment",
    "House",
    "Condo",
    "Townhouse",
    "Villa",
    "Studio",
    "Loft",
    "Penthouse",
];

/// Amenity vocabulary offered as suggestions.
const AMENITIES: [&str; 18] = [
    "WiFi",
    "Air Conditioning",
    "Heating",
    "Kitchen",
    "Washing Machine",
    "Dryer",
    "Dishwasher",
    "Parking",
    "Gym",
    "Pool",
    "Garden",
    "Balcony",
    "Fireplace",
    "Elevator",
    "Doorman",
    "Security System",
    "Pet Friendly",
    "Furnished",
];

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_listings).post(search_listings_post))
        .route("/nearby", get(search_nearby))
        .route("/suggestions", get(get_search_suggestions))
        .route("/stats", get(get_search_stats))
}

/// Search hides unavailable inventory unless the caller asks otherwise.
fn apply_search_defaults(search: &mut ListingSearch) {
    if search.available_only.is_none() {
        search.available_only = Some(true);
    }
}

/// Search listings with filters and sorting.
pub async fn search_listings(
    Extension(state): Extension<AppState>,
    Query(mut search): Query<ListingSearch>,
) -> ApiResult<Json<ListingPage<Listing>>> {
    apply_search_defaults(&mut search);
    let page = PageRequest::paged(search.page, search.limit, SEARCH_PAGE_SIZE);
    let outcome = pipeline::run(state.deps.store(), &search, page).await?;
    Ok(Json(ListingPage::from_outcome(outcome, Listing::clone)))
}

/// Same search, parameters as a JSON body. An omitted limit returns the
/// entire filtered set.
pub async fn search_listings_post(
    Extension(state): Extension<AppState>,
    Json(mut search): Json<ListingSearch>,
) -> ApiResult<Json<ListingPage<Listing>>> {
    apply_search_defaults(&mut search);
    let page = PageRequest::paged_or_all(search.page, search.limit);
    let outcome = pipeline::run(state.deps.store(), &search, page).await?;
    Ok(Json(ListingPage::from_outcome(outcome, Listing::clone)))
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_nearby_limit")]
    pub limit: u32,
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_nearby_limit() -> u32 {
    20
}

/// Available listings inside a bounding box around a point, closest first.
pub async fn search_nearby(
    Extension(state): Extension<AppState>,
    Query(params): Query<NearbyParams>,
) -> ApiResult<Json<Vec<Listing>>> {
    // ~111 km per degree of latitude; good enough for a city-scale box.
    let radius_degrees = params.radius_km.clamp(0.1, 100.0) / 111.0;
    let limit = params.limit.clamp(1, 100) as u64;

    let query = StoreQuery::new()
        .eq("is_available", true)
        .gte("latitude", params.latitude - radius_degrees)
        .lte("latitude", params.latitude + radius_degrees)
        .gte("longitude", params.longitude - radius_degrees)
        .lte("longitude", params.longitude + radius_degrees)
        .limit(limit);

    let rows = state.deps.store().select(collections::LISTINGS, &query).await?;
    let mut listings = rows
        .into_iter()
        .map(Listing::from_row)
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Squared planar distance is enough to rank within the box.
    let distance = |listing: &Listing| {
        let dlat = listing.latitude - params.latitude;
        let dlon = listing.longitude - params.longitude;
        dlat * dlat + dlon * dlon
    };
    listings.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    listings.truncate(limit as usize);

    Ok(Json(listings))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub property_types: Vec<String>,
    pub amenities: Vec<String>,
}

/// Completion candidates for a partial query: stored cities and
/// neighborhoods plus the static vocabularies.
pub async fn get_search_suggestions(
    Extension(state): Extension<AppState>,
    Query(params): Query<SuggestionParams>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let store = state.deps.store();
    let needle = params.q.trim();

    let cities = distinct_column_matches(store, "city", needle).await?;
    let neighborhoods = distinct_column_matches(store, "neighborhood", needle).await?;

    let lowered = needle.to_lowercase();
    let property_types = PROPERTY_TYPES
        .iter()
        .filter(|t| t.to_lowercase().contains(&lowered))
        .map(|t| t.to_string())
        .collect();
    let amenities = AMENITIES
        .iter()
        .filter(|a| a.to_lowercase().contains(&lowered))
        .map(|a| a.to_string())
        .collect();

    Ok(Json(SuggestionsResponse {
        cities,
        neighborhoods,
        property_types,
        amenities,
    }))
}

async fn distinct_column_matches(
    store: &dyn crate::kernel::BaseRecordStore,
    column: &str,
    needle: &str,
) -> anyhow::Result<Vec<String>> {
    let query = StoreQuery::new().any_ilike(&[column], needle).limit(5);
    let rows = store.select(collections::LISTINGS, &query).await?;
    let mut values: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get(column).and_then(serde_json::Value::as_str))
        .map(String::from)
        .collect();
    values.sort();
    values.dedup();
    Ok(values)
}

#[derive(Debug, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_listings: u64,
    pub available_listings: u64,
    pub featured_listings: u64,
    pub price_range: PriceRange,
    pub cities_count: usize,
    pub property_types_count: usize,
}

/// Inventory statistics: exact counts, the effective-price range, and how
/// many distinct cities and property types carry listings.
pub async fn get_search_stats(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<StatsResponse>> {
    let store = state.deps.store();

    let total_listings = store.count(collections::LISTINGS, &StoreQuery::new()).await?;
    let available_listings = store
        .count(
            collections::LISTINGS,
            &StoreQuery::new().eq("is_available", true),
        )
        .await?;
    let featured_listings = store
        .count(
            collections::LISTINGS,
            &StoreQuery::new().eq("is_featured", true),
        )
        .await?;

    let rows = store.select(collections::LISTINGS, &StoreQuery::new()).await?;
    let listings = rows
        .into_iter()
        .map(Listing::from_row)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let prices: Vec<f64> = listings.iter().filter_map(effective_price).collect();
    let price_range = if prices.is_empty() {
        PriceRange {
            min: 0.0,
            max: 0.0,
            avg: 0.0,
        }
    } else {
        PriceRange {
            min: prices.iter().cloned().fold(f64::INFINITY, f64::min),
            max: prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            avg: prices.iter().sum::<f64>() / prices.len() as f64,
        }
    };

    let mut cities: Vec<&str> = listings.iter().map(|l| l.city.as_str()).collect();
    cities.sort();
    cities.dedup();
    let mut property_types: Vec<&str> = listings.iter().map(|l| l.property_type.as_str()).collect();
    property_types.sort();
    property_types.dedup();

    Ok(Json(StatsResponse {
        total_listings,
        available_listings,
        featured_listings,
        price_range,
        cities_count: cities.len(),
        property_types_count: property_types.len(),
    }))
}
