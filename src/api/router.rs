use super::{AppState, handlers};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the dashboard router with all routes and shared state.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/tables", get(handlers::get_tables))
        .route("/api/funding", get(handlers::get_funding))
        .route("/api/open-interest", get(handlers::get_open_interest))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
