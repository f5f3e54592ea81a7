//! User profile CRUD.

use axum::extract::{Extension, Path, Query};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::UserId;
use crate::domains::users::{NewUser, User, UserPatch};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/:user_id", get(get_user).put(update_user).delete(delete_user))
        .route("/email/:email", get(get_user_by_email))
        .route("/hosts/list", get(get_hosts))
        .route("/verified/list", get(get_verified_users))
        .route("/:user_id/verify", put(verify_user))
        .route("/:user_id/unverify", put(unverify_user))
}

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_list_limit")]
    pub limit: u64,
    pub is_host: Option<bool>,
    pub is_verified: Option<bool>,
}

fn default_list_limit() -> u64 {
    20
}

/// Get all users with optional filters.
pub async fn get_users(
    Extension(state): Extension<AppState>,
    Query(params): Query<UserListParams>,
) -> ApiResult<Json<Vec<User>>> {
    let limit = params.limit.clamp(1, 100);
    let users = User::list(
        params.skip,
        limit,
        params.is_host,
        params.is_verified,
        state.deps.store(),
    )
    .await?;
    Ok(Json(users))
}

pub async fn get_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = UserId::from(user_id);
    match User::find_by_id(&id, state.deps.store()).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}

pub async fn get_user_by_email(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<User>> {
    match User::find_by_email(&email, state.deps.store()).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}

pub async fn create_user(
    Extension(state): Extension<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Json<User>> {
    let user = User::create(new_user, state.deps.store()).await?;
    Ok(Json(user))
}

pub async fn update_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    let id = UserId::from(user_id);
    match User::update(&id, &patch, state.deps.store()).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}

pub async fn delete_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = UserId::from(user_id);
    if User::delete(&id, state.deps.store()).await? {
        Ok(Json(json!({ "message": "User deleted successfully" })))
    } else {
        Err(ApiError::NotFound("User"))
    }
}

pub async fn get_hosts(Extension(state): Extension<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::hosts(state.deps.store()).await?))
}

pub async fn get_verified_users(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::verified(state.deps.store()).await?))
}

pub async fn verify_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    set_verified(&state, user_id, true, "User verified successfully").await
}

pub async fn unverify_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    set_verified(&state, user_id, false, "User unverified successfully").await
}

async fn set_verified(
    state: &AppState,
    user_id: String,
    is_verified: bool,
    message: &str,
) -> ApiResult<Json<Value>> {
    let id = UserId::from(user_id);
    if User::set_verified(&id, is_verified, state.deps.store()).await? {
        Ok(Json(json!({ "message": message })))
    } else {
        Err(ApiError::NotFound("User"))
    }
}
