use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Anything that stops a snapshot from being fetched upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Cache artifact failures. Never surfaced past the caching source.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache artifact is not a valid snapshot: {0}")]
    Decode(serde_json::Error),

    #[error("failed to serialize snapshot: {0}")]
    Encode(serde_json::Error),
}

/// Errors returned to dashboard clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("upstream market data unavailable: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
