// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{server::build_app, Config};
use server_core::kernel::{GoTrueClient, ServerDeps, SupabaseStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dream Haven API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Hosted collaborators: record store + identity service
    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_service_role_key)
        .context("Failed to create record store client")?;
    let identity = GoTrueClient::new(&config.supabase_url, &config.supabase_anon_key)
        .context("Failed to create identity service client")?;
    let deps = ServerDeps::new(Arc::new(store), Arc::new(identity));

    // Build application
    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
