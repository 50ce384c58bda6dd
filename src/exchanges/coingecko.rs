use super::{SnapshotSource, is_allowed_market};
use crate::config::Config;
use crate::errors::UpstreamError;
use crate::models::ContractRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// One entry of CoinGecko's `/derivatives` listing. Only the fields the
/// dashboard needs; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct DerivativeItem {
    market: String,

    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    index_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    open_interest: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    funding_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    volume_24h: Option<f64>,
}

/// CoinGecko sends numbers, numeric strings or null depending on the venue.
/// Anything that isn't a finite number comes through as `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Identifiers occasionally arrive as bare numbers; other non-string values
/// are treated as missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub struct CoinGecko {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGecko {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    /// The raw listing. Items stay untyped until their market has been checked.
    async fn request_items(&self) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/derivatives", self.base_url);

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Keeps allow-listed items and stamps them all with the same fetch time.
/// Items from other markets are dropped before any of their fields are read.
/// Items without an `index_id` have no table row to land in and are dropped.
fn filter_items(
    items: Vec<Value>,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<ContractRecord>, serde_json::Error> {
    let mut records = Vec::new();

    for item in items {
        let allowed = item
            .get("market")
            .and_then(Value::as_str)
            .is_some_and(is_allowed_market);
        if !allowed {
            continue;
        }

        let item: DerivativeItem = serde_json::from_value(item)?;
        let Some(token) = item.index_id else {
            tracing::debug!("[coingecko] {} listing without index_id dropped", item.market);
            continue;
        };

        records.push(ContractRecord {
            market: item.market,
            symbol: item.symbol.unwrap_or_default(),
            token,
            open_interest: item.open_interest,
            funding_rate: item.funding_rate,
            volume_24h: item.volume_24h,
            fetched_at,
        });
    }

    Ok(records)
}

#[async_trait]
impl SnapshotSource for CoinGecko {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    /// One GET of the derivatives listing, filtered to the allow-list.
    /// No retries: a failure goes straight back to the caller.
    async fn fetch_snapshot(&self) -> Result<Vec<ContractRecord>, UpstreamError> {
        tracing::info!("[{}] fetching derivatives listing", self.name());

        let fetched = self.request_items().await.and_then(|items| {
            let received = items.len();
            Ok((received, filter_items(items, Utc::now())?))
        });
        let (received, records) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                metrics::counter!("upstream_fetches_total", "outcome" => "error").increment(1);
                return Err(e);
            }
        };
        metrics::counter!("upstream_fetches_total", "outcome" => "ok").increment(1);

        tracing::info!(
            "[{}] kept {} of {} listings",
            self.name(),
            records.len(),
            received
        );

        Ok(records)
    }
}
