use axum::http::HeaderMap;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

use crate::domains::auth::AuthUser;
use crate::kernel::BaseIdentityService;

/// Bearer-token authentication middleware
///
/// Extracts the bearer token from the Authorization header, asks the hosted
/// identity service to resolve it, and adds AuthUser to request extensions.
/// If no token or an invalid token, the request continues without AuthUser
/// (public access); protected handlers turn its absence into a 401.
pub async fn bearer_auth_middleware(
    identity: Arc<dyn BaseIdentityService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match identity.verify_token(token).await {
            Ok(user) => {
                debug!("Authenticated user: {}", user.id);
                request.extensions_mut().insert(user);
            }
            Err(err) => {
                debug!(error = %err, "Bearer token did not verify");
            }
        }
    }

    next.run(request).await
}

/// The bearer credential from an Authorization header, if present.
/// Tolerates both "Bearer <token>" and a raw token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc123")),
            Some("abc123")
        );
    }

    #[test]
    fn accepts_raw_token() {
        assert_eq!(bearer_token(&headers_with("abc123")), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_header_is_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }
}
