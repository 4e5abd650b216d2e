// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over the mushroom catalog
// Usage: cargo run --features api --bin api_server

use anyhow::Context;
use mushroom_catalog::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging; RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Catalog and request tracing by default, warn elsewhere
                    "mushroom_catalog=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = AppConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Configuration:");
    tracing::info!("  CATALOG: {}", config.catalog_url.as_deref().unwrap_or(&config.catalog_path.display().to_string()));
    tracing::info!("  CLASSIFIER_URL: {}", config.classifier_url);
    tracing::info!("  PORT: {}", config.port);

    // Initialize application state (loads the catalog)
    let state = AppState::new(&config).await?;
    tracing::info!("Application state initialized ({:?})", state.store.state());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
