//! Authentication domain: session/user types shared between the identity
//! boundary and the HTTP layer. Credential checks themselves are delegated
//! to the hosted identity service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The identity a verified token resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// A live session as issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Failures from the identity boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error(transparent)]
    Service(#[from] anyhow::Error),
}
