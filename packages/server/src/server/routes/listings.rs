//! Listing CRUD and the listings grid.
//!
//! `GET /` runs the shared query pipeline and answers in the card shape;
//! everything else is a thin single-query mapping.

use axum::extract::{Extension, Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::common::{ListingId, PageRequest, UserId, DEFAULT_PAGE_SIZE};
use crate::domains::listings::{
    pipeline, Listing, ListingCard, ListingPage, ListingPatch, ListingSearch, NewListing,
};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_filtered_listings).post(create_listing))
        .route(
            "/:listing_id",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
        .route("/host/:host_id", get(get_listings_by_host))
        .route("/cities/list", get(get_cities))
        .route("/types/list", get(get_property_types))
}

/// Get filtered property listings with pagination support.
pub async fn get_filtered_listings(
    Extension(state): Extension<AppState>,
    Query(search): Query<ListingSearch>,
) -> ApiResult<Json<ListingPage<ListingCard>>> {
    let page = PageRequest::paged(search.page, search.limit, DEFAULT_PAGE_SIZE);
    let outcome = pipeline::run(state.deps.store(), &search, page).await?;
    let now = Utc::now();
    Ok(Json(ListingPage::from_outcome(outcome, |listing| {
        ListingCard::from_listing(listing, now)
    })))
}

/// Get a specific listing by ID - the full record.
pub async fn get_listing(
    Extension(state): Extension<AppState>,
    Path(listing_id): Path<String>,
) -> ApiResult<Json<Listing>> {
    let id = ListingId::from(listing_id);
    match Listing::find_by_id(&id, state.deps.store()).await? {
        Some(listing) => Ok(Json(listing)),
        None => Err(ApiError::NotFound("Listing")),
    }
}

/// Create a new listing.
pub async fn create_listing(
    Extension(state): Extension<AppState>,
    Json(new_listing): Json<NewListing>,
) -> ApiResult<Json<Listing>> {
    new_listing
        .check_price_invariant()
        .map_err(ApiError::BadRequest)?;
    let listing = Listing::create(new_listing, state.deps.store()).await?;
    Ok(Json(listing))
}

/// Update an existing listing; only supplied fields change.
pub async fn update_listing(
    Extension(state): Extension<AppState>,
    Path(listing_id): Path<String>,
    Json(patch): Json<ListingPatch>,
) -> ApiResult<Json<Listing>> {
    let id = ListingId::from(listing_id);
    match Listing::update(&id, &patch, state.deps.store()).await? {
        Some(listing) => Ok(Json(listing)),
        None => Err(ApiError::NotFound("Listing")),
    }
}

/// Delete a listing.
pub async fn delete_listing(
    Extension(state): Extension<AppState>,
    Path(listing_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = ListingId::from(listing_id);
    if Listing::delete(&id, state.deps.store()).await? {
        Ok(Json(json!({ "message": "Listing deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Listing"))
    }
}

/// All listings owned by one host.
pub async fn get_listings_by_host(
    Extension(state): Extension<AppState>,
    Path(host_id): Path<String>,
) -> ApiResult<Json<Vec<Listing>>> {
    let host_id = UserId::from(host_id);
    let listings = Listing::find_by_host(&host_id, state.deps.store()).await?;
    Ok(Json(listings))
}

/// Distinct "City, State" values with listings.
pub async fn get_cities(Extension(state): Extension<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(Listing::cities(state.deps.store()).await?))
}

/// Distinct property types.
pub async fn get_property_types(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(Listing::property_types(state.deps.store()).await?))
}
