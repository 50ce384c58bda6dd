use super::AppState;
use super::models::{TableView, TablesResponse};
use super::page;
use crate::errors::ApiError;
use crate::pipeline::build_tables_with_limit;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;

/// One snapshot load and one pipeline run, as every page load does.
async fn load_tables(state: &AppState) -> Result<TablesResponse, ApiError> {
    let records = state.source.fetch_snapshot().await.map_err(|e| {
        tracing::error!("[{}] snapshot unavailable: {e}", state.source.name());
        ApiError::from(e)
    })?;

    let fetched_at = records.iter().map(|r| r.fetched_at).max();
    let (funding, open_interest) = build_tables_with_limit(&records, state.top_tokens);

    Ok(TablesResponse {
        fetched_at,
        funding: TableView::funding(funding),
        open_interest: TableView::plain(open_interest),
    })
}

/// GET /health: simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// GET /: the HTML dashboard
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match load_tables(&state).await {
        Ok(tables) => Html(page::render_dashboard(&tables, state.top_tokens)).into_response(),
        Err(e) => (e.status(), Html(page::render_error(&e.to_string()))).into_response(),
    }
}

/// GET /api/tables: both tables plus the fetch time
pub async fn get_tables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TablesResponse>, ApiError> {
    Ok(Json(load_tables(&state).await?))
}

/// GET /api/funding
pub async fn get_funding(State(state): State<Arc<AppState>>) -> Result<Json<TableView>, ApiError> {
    Ok(Json(load_tables(&state).await?.funding))
}

/// GET /api/open-interest
pub async fn get_open_interest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TableView>, ApiError> {
    Ok(Json(load_tables(&state).await?.open_interest))
}
