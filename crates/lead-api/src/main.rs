//! Lead API Service
//!
//! REST API for submitting and listing HaloRide leads

use anyhow::{Context, Result};
use lead_api::{create_router, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_api=debug,lead_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lead API Service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Lead store backend: {}", config.store);

    // Initialize storage
    let store = config
        .build_store()
        .await
        .context("Failed to initialize lead store")?;

    // Create application state
    let state = AppState::new(store, config.public_config());

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.api_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.api_address()))?;

    info!("Lead API listening on http://{}", config.api_address());
    info!("API endpoints:");
    info!("  GET /api/config - Public client configuration");
    info!("  POST /api/leads - Submit a lead");
    info!("  GET /api/leads - List leads");
    info!("  GET /health - Health check");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
