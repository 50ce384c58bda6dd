use perps_dashboard::api::ApiServer;
use perps_dashboard::cache::{CachedSource, FileCache};
use perps_dashboard::config::Config;
use perps_dashboard::exchanges::SnapshotSource;
use perps_dashboard::exchanges::coingecko::CoinGecko;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    tracing::info!(
        "Perps dashboard starting: {} on port {}, top {} tokens",
        config.base_url,
        config.api_port,
        config.top_tokens
    );
    if config.api_key.is_none() {
        tracing::warn!("COINGECKO_API_KEY is not set; upstream may reject requests");
    }

    let coingecko = CoinGecko::from_config(&config)?;

    let source: Arc<dyn SnapshotSource> = match &config.cache_path {
        Some(path) => {
            tracing::info!(
                "snapshot cache at {} (ttl {}s)",
                path.display(),
                config.cache_ttl.as_secs()
            );
            Arc::new(CachedSource::new(
                coingecko,
                FileCache::new(path),
                config.cache_ttl,
            ))
        }
        None => {
            tracing::info!("snapshot cache disabled; every page load fetches upstream");
            Arc::new(coingecko)
        }
    };

    ApiServer::new(source, config.top_tokens).run(config).await
}
