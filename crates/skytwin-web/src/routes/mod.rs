//! HTTP and WebSocket routes.

mod api;
mod ws;

pub use api::{ApiError, ResetRequest, StepResponse};

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Read-only views
        .route("/api/snapshot", get(api::get_snapshot))
        .route("/api/agents", get(api::get_agents))
        .route("/api/agents/:id", get(api::get_agent))
        .route("/api/events", get(api::get_events))
        .route("/api/stats", get(api::get_stats))
        // Clock commands
        .route("/api/start", post(api::start))
        .route("/api/pause", post(api::pause))
        .route("/api/reset", post(api::reset))
        .route("/api/step", post(api::step))
        // WebSocket for live events
        .route("/ws/events", get(ws::events_handler))
        // Renderers are served from elsewhere
        .layer(CorsLayer::permissive())
        .with_state(state)
}
