use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::kernel::{collections, StoreQuery};
use crate::server::app::AppState;

/// Root welcome document.
pub async fn welcome_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Dream Haven backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    record_store: RecordStoreHealth,
}

#[derive(Serialize)]
pub struct RecordStoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Probes the hosted record store with a one-row select under a short
/// timeout. Returns 200 OK when reachable, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = StoreQuery::new().limit(1);
    let record_store = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.deps.store().select(collections::LISTINGS, &probe),
    )
    .await
    {
        Ok(Ok(_)) => RecordStoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => RecordStoreHealth {
            status: "error".to_string(),
            error: Some(format!("Probe failed: {}", e)),
        },
        Err(_) => RecordStoreHealth {
            status: "error".to_string(),
            error: Some("Probe timeout (>5s)".to_string()),
        },
    };

    let is_healthy = record_store.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            service: "dream-haven-backend".to_string(),
            record_store,
        }),
    )
}
