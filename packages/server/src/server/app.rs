//! Application setup and server configuration.

use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::bearer_auth_middleware;
use crate::server::routes;
use crate::server::routes::health::{health_handler, welcome_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

/// Build the Axum application router.
///
/// All collaborators come in through `deps`; nothing here is process-global,
/// so a test can build an app around the in-memory store and mock identity
/// service.
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let state = AppState { deps: deps.clone() };

    // CORS: the configured frontend origins only.
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Clone identity for the middleware closure
    let identity = deps.identity_arc();

    Router::new()
        .route("/", get(welcome_handler))
        .route("/health", get(health_handler))
        .nest("/auth", routes::auth::router())
        .nest("/buyers", routes::buyers::router())
        .nest("/listings", routes::listings::router())
        .nest("/search", routes::search::router())
        .nest("/users", routes::users::router())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            bearer_auth_middleware(identity.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
}
