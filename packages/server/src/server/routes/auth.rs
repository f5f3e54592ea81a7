//! Authentication endpoints.
//!
//! Every credential operation is forwarded to the hosted identity service;
//! this module only shapes requests and responses and keeps the buyer
//! profile row in sync on registration.

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::UserId;
use crate::domains::auth::AuthUser;
use crate::domains::buyers::Buyer;
use crate::domains::users::User;
use crate::kernel::JsonObject;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::server::middleware::bearer_token;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh_token))
        .route("/me", get(get_current_user))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Saved search preferences to seed the buyer profile with.
    #[serde(default)]
    pub preferences: Option<JsonObject>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Value,
    pub expires_in: i64,
}

/// The profile row for an authenticated identity, falling back to the bare
/// id/email pair when no profile exists yet.
async fn profile_payload(state: &AppState, user: &AuthUser) -> ApiResult<Value> {
    let id = UserId::from(user.id.as_str());
    match User::find_by_id(&id, state.deps.store()).await? {
        Some(profile) => Ok(serde_json::to_value(profile).map_err(anyhow::Error::from)?),
        None => Ok(json!({ "id": user.id, "email": user.email })),
    }
}

/// Buyer login with email and password.
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session = state
        .deps
        .identity()
        .sign_in(&credentials.email, &credentials.password)
        .await?;
    let user = profile_payload(&state, &session.user).await?;

    Ok(Json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user,
        expires_in: session.expires_in,
    }))
}

/// Buyer registration: create the hosted identity, then provision the buyer
/// profile row under the same id.
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(registration): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut metadata = JsonObject::new();
    metadata.insert("first_name".to_string(), json!(registration.first_name));
    metadata.insert("last_name".to_string(), json!(registration.last_name));
    metadata.insert("user_type".to_string(), json!("buyer"));

    let session = state
        .deps
        .identity()
        .sign_up(&registration.email, &registration.password, metadata)
        .await?;

    let buyer = Buyer::provision(
        &session.user.id,
        &registration.email,
        &registration.first_name,
        &registration.last_name,
        registration.phone.clone(),
        registration.preferences.clone(),
        state.deps.store(),
    )
    .await?;

    Ok(Json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: serde_json::to_value(buyer).map_err(anyhow::Error::from)?,
        expires_in: session.expires_in,
    }))
}

/// User logout.
pub async fn logout(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    state.deps.identity().sign_out(token).await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// Exchange a refresh token for a new session.
pub async fn refresh_token(
    Extension(state): Extension<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session = state.deps.identity().refresh(&request.refresh_token).await?;
    let user = profile_payload(&state, &session.user).await?;

    Ok(Json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user,
        expires_in: session.expires_in,
    }))
}

/// Get the current authenticated user.
pub async fn get_current_user(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
) -> ApiResult<Json<Value>> {
    let Extension(user) =
        auth_user.ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;
    let payload = profile_payload(&state, &user).await?;
    Ok(Json(payload))
}

/// Send a password reset email.
pub async fn forgot_password(
    Extension(state): Extension<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> ApiResult<Json<Value>> {
    state
        .deps
        .identity()
        .send_password_reset(&request.email)
        .await?;
    Ok(Json(json!({ "message": "Password reset email sent" })))
}

/// Reset a password with a recovery token.
pub async fn reset_password(
    Extension(state): Extension<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .deps
        .identity()
        .update_password(&request.token, &request.password)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Change the password of the authenticated user.
pub async fn change_password(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    state
        .deps
        .identity()
        .update_password(token, &request.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
