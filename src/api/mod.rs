pub mod handlers;
pub mod models;
pub mod page;
pub mod router;

use crate::config::Config;
use crate::exchanges::SnapshotSource;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared handler state: where snapshots come from and how many tokens to show.
pub struct AppState {
    pub source: Arc<dyn SnapshotSource>,
    pub top_tokens: usize,
}

impl AppState {
    pub fn new(source: Arc<dyn SnapshotSource>, top_tokens: usize) -> Self {
        Self { source, top_tokens }
    }
}

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(source: Arc<dyn SnapshotSource>, top_tokens: usize) -> Self {
        Self {
            state: Arc::new(AppState::new(source, top_tokens)),
        }
    }

    /// Binds the server to the configured port and serves until Ctrl+C.
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let app = router::build(Arc::clone(&self.state))
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
        tracing::info!("dashboard listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
