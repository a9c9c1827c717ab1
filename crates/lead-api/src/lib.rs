//! Lead API
//!
//! HTTP surface for the HaloRide lead form: validates submissions with the
//! server profile of the shared schema and persists them through whichever
//! [`LeadStore`] the deployment is configured with.
//!
//! ## Endpoints
//!
//! - `GET /api/config` - Public Supabase credentials for the browser
//! - `POST /api/leads` - Validate and store a lead
//! - `GET /api/leads` - List every stored lead (unauthenticated, unpaginated)
//! - `GET /health` - Health check

pub mod config;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use haloride_common::{LeadSchema, PublicConfig};
use lead_store::LeadStore;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{Config, StoreKind};

/// Application state shared across handlers
pub struct AppState {
    /// Where leads are persisted
    pub store: Arc<dyn LeadStore>,

    /// Rules applied to every submission
    pub schema: LeadSchema,

    /// Credentials served by `/api/config`
    pub public_config: PublicConfig,
}

impl AppState {
    /// Create new application state using the server validation profile
    pub fn new(store: Arc<dyn LeadStore>, public_config: PublicConfig) -> Self {
        Self {
            store,
            schema: LeadSchema::server(),
            public_config,
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/config", get(handlers::config_handler))
        .route(
            "/api/leads",
            post(handlers::create_lead_handler).get(handlers::list_leads_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
