use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One perpetual contract listing on one allow-listed exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Exchange display name, e.g. "Bybit (Futures)"
    pub market: String,
    pub symbol: String,
    /// Underlying asset (upstream `index_id`), used as the table row key
    pub token: String,
    pub open_interest: Option<f64>,
    /// Already expressed in percent
    pub funding_rate: Option<f64>,
    pub volume_24h: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

/// The unit persisted by the snapshot cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub data: Vec<ContractRecord>,
    pub fetched_at: DateTime<Utc>,
}
