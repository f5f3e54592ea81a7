//! Buyer CRUD and saved preferences.

use axum::extract::{Extension, Path, Query};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::BuyerId;
use crate::domains::buyers::{Buyer, BuyerPatch, BuyerPreferences};
use crate::kernel::JsonObject;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_buyers))
        .route("/:buyer_id", get(get_buyer).put(update_buyer).delete(delete_buyer))
        .route("/email/:email", get(get_buyer_by_email))
        .route(
            "/:buyer_id/preferences",
            get(get_buyer_preferences).put(update_buyer_preferences),
        )
        .route("/verified/list", get(get_verified_buyers))
        .route("/:buyer_id/verify", put(verify_buyer))
        .route("/:buyer_id/unverify", put(unverify_buyer))
}

#[derive(Debug, Deserialize)]
pub struct BuyerListParams {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_list_limit")]
    pub limit: u64,
    pub is_verified: Option<bool>,
}

fn default_list_limit() -> u64 {
    20
}

/// Get all buyers with optional filters.
pub async fn get_buyers(
    Extension(state): Extension<AppState>,
    Query(params): Query<BuyerListParams>,
) -> ApiResult<Json<Vec<Buyer>>> {
    let limit = params.limit.clamp(1, 100);
    let buyers = Buyer::list(params.skip, limit, params.is_verified, state.deps.store()).await?;
    Ok(Json(buyers))
}

pub async fn get_buyer(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
) -> ApiResult<Json<Buyer>> {
    let id = BuyerId::from(buyer_id);
    match Buyer::find_by_id(&id, state.deps.store()).await? {
        Some(buyer) => Ok(Json(buyer)),
        None => Err(ApiError::NotFound("Buyer")),
    }
}

pub async fn get_buyer_by_email(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Buyer>> {
    match Buyer::find_by_email(&email, state.deps.store()).await? {
        Some(buyer) => Ok(Json(buyer)),
        None => Err(ApiError::NotFound("Buyer")),
    }
}

pub async fn update_buyer(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
    Json(patch): Json<BuyerPatch>,
) -> ApiResult<Json<Buyer>> {
    let id = BuyerId::from(buyer_id);
    match Buyer::update(&id, &patch, state.deps.store()).await? {
        Some(buyer) => Ok(Json(buyer)),
        None => Err(ApiError::NotFound("Buyer")),
    }
}

/// Replace a buyer's saved search preferences.
pub async fn update_buyer_preferences(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
    Json(preferences): Json<BuyerPreferences>,
) -> ApiResult<Json<Value>> {
    let id = BuyerId::from(buyer_id);
    if Buyer::update_preferences(&id, &preferences, state.deps.store()).await? {
        Ok(Json(json!({ "message": "Preferences updated successfully" })))
    } else {
        Err(ApiError::NotFound("Buyer"))
    }
}

pub async fn get_buyer_preferences(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
) -> ApiResult<Json<JsonObject>> {
    let id = BuyerId::from(buyer_id);
    match Buyer::find_by_id(&id, state.deps.store()).await? {
        Some(buyer) => Ok(Json(buyer.preferences)),
        None => Err(ApiError::NotFound("Buyer")),
    }
}

pub async fn delete_buyer(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = BuyerId::from(buyer_id);
    if Buyer::delete(&id, state.deps.store()).await? {
        Ok(Json(json!({ "message": "Buyer deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Buyer"))
    }
}

pub async fn get_verified_buyers(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<Buyer>>> {
    Ok(Json(Buyer::verified(state.deps.store()).await?))
}

pub async fn verify_buyer(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
) -> ApiResult<Json<Value>> {
    set_verified(&state, buyer_id, true, "Buyer verified successfully").await
}

pub async fn unverify_buyer(
    Extension(state): Extension<AppState>,
    Path(buyer_id): Path<String>,
) -> ApiResult<Json<Value>> {
    set_verified(&state, buyer_id, false, "Buyer unverified successfully").await
}

async fn set_verified(
    state: &AppState,
    buyer_id: String,
    is_verified: bool,
    message: &str,
) -> ApiResult<Json<Value>> {
    let id = BuyerId::from(buyer_id);
    if Buyer::set_verified(&id, is_verified, state.deps.store()).await? {
        Ok(Json(json!({ "message": message })))
    } else {
        Err(ApiError::NotFound("Buyer"))
    }
}
