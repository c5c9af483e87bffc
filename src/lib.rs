//! # arr-warden library
//!
//! Webhook intake and language-policy enforcement for Sonarr/Radarr:
//! - Profile store mapping routing keys to configured instances
//! - Backend clients running the validate/match/evaluate/remediate pipeline
//! - HTTP API (webhook intake, health)
//! - Profile file change watching

pub mod api;
pub mod clients;
pub mod compliance;
pub mod config;
pub mod error;
pub mod instance;
pub mod net;
pub mod store;
pub mod watch;

pub use error::{Error, Result};

use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use store::ProfileStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Routing-key -> instance store, swapped wholesale on reload
    pub store: Arc<ProfileStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(api::handle_webhook))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
