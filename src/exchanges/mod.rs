use crate::errors::UpstreamError;
use crate::models::ContractRecord;
use async_trait::async_trait;

pub mod coingecko;

/// An exchange the dashboard shows: upstream id and the display name
/// that appears in the `market` field of derivatives listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub id: &'static str,
    pub name: &'static str,
}

#[rustfmt::skip]
pub const ALLOWED_EXCHANGES: [Exchange; 21] = [
    Exchange { id: "binance_futures", name: "Binance (Futures)" },
    Exchange { id: "bitget_futures", name: "Bitget Futures" },
    Exchange { id: "bybit", name: "Bybit (Futures)" },
    Exchange { id: "coinw_futures", name: "CoinW (Futures)" },
    Exchange { id: "gate_futures", name: "Gate (Futures)" },
    Exchange { id: "hyperliquid", name: "Hyperliquid (Futures)" },
    Exchange { id: "weex-futures", name: "WEEX (Futures)" },
    Exchange { id: "okex_swap", name: "OKX (Futures)" },
    Exchange { id: "xt_derivatives", name: "XT.COM (Derivatives)" },
    Exchange { id: "huobi_dm", name: "HTX Futures" },
    Exchange { id: "coincatch_derivatives", name: "CoinCatch Derivatives" },
    Exchange { id: "mxc_futures", name: "MEXC (Futures)" },
    Exchange { id: "bitmart_futures", name: "Bitmart Futures" },
    Exchange { id: "whitebit_futures", name: "WhiteBIT Futures" },
    Exchange { id: "toobit_derivatives", name: "Toobit Futures" },
    Exchange { id: "bingx_futures", name: "BingX (Futures)" },
    Exchange { id: "deepcoin_derivatives", name: "Deepcoin (Derivatives)" },
    Exchange { id: "dmex", name: "DMEX" },
    Exchange { id: "kumex", name: "KuCoin Futures" },
    Exchange { id: "lbank-futures", name: "LBank (Futures)" },
    Exchange { id: "deribit", name: "Deribit" },
];

/// Exact, case-sensitive match against the allow-listed display names.
pub fn is_allowed_market(market: &str) -> bool {
    ALLOWED_EXCHANGES.iter().any(|ex| ex.name == market)
}

/// Something that can produce the current set of allow-listed contract records.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every returned record shares one `fetched_at`.
    async fn fetch_snapshot(&self) -> Result<Vec<ContractRecord>, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allow_list_names_and_ids_are_unique() {
        let names: HashSet<_> = ALLOWED_EXCHANGES.iter().map(|e| e.name).collect();
        let ids: HashSet<_> = ALLOWED_EXCHANGES.iter().map(|e| e.id).collect();
        assert_eq!(names.len(), 21);
        assert_eq!(ids.len(), 21);
    }

    #[test]
    fn market_match_is_literal() {
        assert!(is_allowed_market("Bybit (Futures)"));
        assert!(is_allowed_market("Deribit"));
        assert!(!is_allowed_market("bybit (futures)"));
        assert!(!is_allowed_market("Bybit (Futures) "));
        assert!(!is_allowed_market("bybit"));
        assert!(!is_allowed_market("Unknown Exchange"));
    }
}
