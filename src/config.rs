use crate::pipeline::TOP_TOKENS;
use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub api_port: u16,
    /// `None` disables the disk cache; every page load then hits upstream.
    pub cache_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub top_tokens: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_port: 3000,
            cache_path: None,
            cache_ttl: Duration::from_secs(4 * 60 * 60),
            top_tokens: TOP_TOKENS,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("COINGECKO_API_KEY").filter(|k| !k.trim().is_empty());

        let base_url = lookup("COINGECKO_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let api_port = parse_var(&lookup, "API_PORT")?.unwrap_or(defaults.api_port);

        let cache_path = lookup("CACHE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let cache_ttl = parse_var(&lookup, "CACHE_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let top_tokens = parse_var(&lookup, "TOP_TOKENS")?.unwrap_or(defaults.top_tokens);

        let request_timeout = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            api_key,
            base_url,
            api_port,
            cache_path,
            cache_ttl,
            top_tokens,
            request_timeout,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid number, got {raw:?}"))
        })
        .transpose()
}
