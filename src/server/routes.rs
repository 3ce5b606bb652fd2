//! HTTP API Route Definitions
//!
//! Defines the REST API routes for retrofeed.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Create the API router with all routes
pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // One-shot lookups
        .route("/archive-search", get(handlers::archive_search))
        .route("/archive-item", get(handlers::archive_item))
        // Server-held feed session
        .route("/feed/next", get(handlers::feed_next))
        .route("/feed/refresh", post(handlers::feed_refresh))
        .with_state(app_state);

    Router::new().nest("/api", api)
}
