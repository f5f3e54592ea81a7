//! API error taxonomy and its HTTP mapping.
//!
//! Malformed filter values never reach this module - they degrade to "no
//! constraint" inside the pipeline. What's left: not-found (404), bad write
//! payloads (400), auth failures (401), and store trouble (500 with a
//! generic detail; the cause is logged, never leaked).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domains::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::InvalidToken => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::RegistrationFailed(detail) => {
                ApiError::BadRequest(format!("Registration failed: {}", detail))
            }
            AuthError::Service(err) => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, detail),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed on an internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
