pub mod format;

use crate::models::ContractRecord;
use format::{format_funding, format_open_interest};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Number of tokens kept in each display table.
pub const TOP_TOKENS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub token: String,
    /// One formatted cell per table column, same order.
    pub cells: Vec<String>,
}

/// Token × exchange matrix of display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn row(&self, token: &str) -> Option<&DisplayRow> {
        self.rows.iter().find(|r| r.token == token)
    }

    pub fn cell(&self, token: &str, market: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == market)?;
        self.row(token).map(|r| r.cells[col].as_str())
    }
}

/// (token, market) → the chosen record, ordered by token then market.
pub type BestContracts<'a> = BTreeMap<(&'a str, &'a str), &'a ContractRecord>;

/// Missing and non-finite volumes rank below every real volume.
fn volume_key(record: &ContractRecord) -> Option<OrderedFloat<f64>> {
    record
        .volume_24h
        .filter(|v| v.is_finite())
        .map(OrderedFloat)
}

/// Highest-volume record per (token, market). On equal volume the record
/// seen first in `records` is kept.
pub fn best_per_pair(records: &[ContractRecord]) -> BestContracts<'_> {
    let mut best = BestContracts::new();

    for record in records {
        best.entry((record.token.as_str(), record.market.as_str()))
            .and_modify(|current| {
                if volume_key(record) > volume_key(current) {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    best
}

/// The `limit` tokens with the largest summed best-per-pair volume, largest
/// first. Missing volume counts as zero; equal sums fall back to token order.
pub fn rank_tokens<'a>(best: &BestContracts<'a>, limit: usize) -> Vec<&'a str> {
    let mut totals: BTreeMap<&'a str, f64> = BTreeMap::new();
    for (&(token, _), record) in best {
        let volume = volume_key(record).map_or(0.0, |v| v.into_inner());
        *totals.entry(token).or_insert(0.0) += volume;
    }

    let mut ranked: Vec<(&'a str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        OrderedFloat(b.1)
            .cmp(&OrderedFloat(a.1))
            .then_with(|| a.0.cmp(b.0))
    });

    ranked.into_iter().take(limit).map(|(token, _)| token).collect()
}

/// One row per token in `tokens` (ascending), one column per market in `best`
/// (ascending). Combinations with no record format as the placeholder.
pub fn pivot<V, F>(
    best: &BestContracts<'_>,
    tokens: &BTreeSet<&str>,
    value: V,
    fmt: F,
) -> DisplayTable
where
    V: Fn(&ContractRecord) -> Option<f64>,
    F: Fn(Option<f64>) -> String,
{
    let columns: BTreeSet<&str> = best.keys().map(|&(_, market)| market).collect();

    let rows = tokens
        .iter()
        .map(|&token| DisplayRow {
            token: token.to_string(),
            cells: columns
                .iter()
                .map(|&market| fmt(best.get(&(token, market)).and_then(|r| value(r))))
                .collect(),
        })
        .collect();

    DisplayTable {
        columns: columns.into_iter().map(str::to_string).collect(),
        rows,
    }
}

/// Funding and open-interest tables for the top `TOP_TOKENS` tokens.
pub fn build_tables(records: &[ContractRecord]) -> (DisplayTable, DisplayTable) {
    build_tables_with_limit(records, TOP_TOKENS)
}

pub fn build_tables_with_limit(
    records: &[ContractRecord],
    limit: usize,
) -> (DisplayTable, DisplayTable) {
    let best = best_per_pair(records);
    let tokens: BTreeSet<&str> = rank_tokens(&best, limit).into_iter().collect();

    let funding = pivot(&best, &tokens, |r| r.funding_rate, format_funding);
    let open_interest = pivot(&best, &tokens, |r| r.open_interest, format_open_interest);

    tracing::debug!(
        "built tables: {} records, {} pairs, {} tokens, {} exchanges",
        records.len(),
        best.len(),
        tokens.len(),
        funding.columns.len()
    );

    (funding, open_interest)
}

#[cfg(test)]
mod tests {
    use super::format::{FundingSignal, classify_cell};
    use super::*;
    use chrono::Utc;

    fn rec(
        market: &str,
        token: &str,
        volume: Option<f64>,
        funding: Option<f64>,
        oi: Option<f64>,
    ) -> ContractRecord {
        ContractRecord {
            market: market.to_string(),
            symbol: format!("{token}-PERP"),
            token: token.to_string(),
            open_interest: oi,
            funding_rate: funding,
            volume_24h: volume,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn keeps_highest_volume_contract_per_pair() {
        let records = vec![
            rec("Bybit (Futures)", "BTC", Some(100.0), Some(0.01), Some(1000.0)),
            rec("Bybit (Futures)", "BTC", Some(50.0), Some(0.02), Some(2000.0)),
        ];

        let (funding, oi) = build_tables(&records);

        assert_eq!(funding.columns, vec!["Bybit (Futures)"]);
        assert_eq!(funding.rows.len(), 1);
        assert_eq!(funding.cell("BTC", "Bybit (Futures)"), Some("0.0100%"));
        assert_eq!(oi.cell("BTC", "Bybit (Futures)"), Some("$1,000"));
    }

    #[test]
    fn missing_volume_loses_to_any_volume() {
        let records = vec![
            rec("OKX (Futures)", "ETH", None, Some(0.5), None),
            rec("OKX (Futures)", "ETH", Some(0.0), Some(0.001), None),
            rec("OKX (Futures)", "ETH", None, Some(0.7), None),
        ];

        let best = best_per_pair(&records);

        assert_eq!(best.len(), 1);
        assert_eq!(best[&("ETH", "OKX (Futures)")].funding_rate, Some(0.001));
    }

    #[test]
    fn equal_volume_keeps_first_seen() {
        let records = vec![
            rec("Deribit", "BTC", Some(10.0), Some(0.001), None),
            rec("Deribit", "BTC", Some(10.0), Some(0.002), None),
        ];

        let best = best_per_pair(&records);

        assert!(std::ptr::eq(best[&("BTC", "Deribit")], &records[0]));
    }

    #[test]
    fn selected_record_is_taken_whole() {
        // The winner has no funding rate; the loser's must not leak in.
        let records = vec![
            rec("Deribit", "BTC", Some(5.0), Some(0.03), Some(10.0)),
            rec("Deribit", "BTC", Some(50.0), None, Some(20.0)),
        ];

        let (funding, oi) = build_tables(&records);

        assert_eq!(funding.cell("BTC", "Deribit"), Some("-"));
        assert_eq!(oi.cell("BTC", "Deribit"), Some("$20"));
    }

    #[test]
    fn every_pair_gets_exactly_one_max_volume_record() {
        let markets = ["Deribit", "OKX (Futures)", "Gate (Futures)"];
        let tokens = ["BTC", "ETH", "SOL", "DOGE"];
        let mut records = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            for (j, market) in markets.iter().enumerate() {
                for k in 0..4 {
                    let volume = ((i * 7 + j * 3 + k * 5) % 11) as f64;
                    records.push(rec(market, token, Some(volume), None, None));
                }
            }
        }

        let best = best_per_pair(&records);

        assert_eq!(best.len(), tokens.len() * markets.len());
        for (&(token, market), chosen) in &best {
            let max = records
                .iter()
                .filter(|r| r.token == token && r.market == market)
                .filter_map(|r| r.volume_24h)
                .fold(f64::MIN, f64::max);
            assert_eq!(chosen.volume_24h, Some(max));
        }
    }

    #[test]
    fn limits_to_top_tokens_by_summed_volume() {
        let mut records = Vec::new();
        for i in 0..150 {
            let token = format!("T{i:03}");
            records.push(rec("Deribit", &token, Some(i as f64), Some(0.01), Some(1.0)));
            records.push(rec("OKX (Futures)", &token, Some(i as f64), None, None));
        }

        let (funding, oi) = build_tables(&records);

        assert_eq!(funding.rows.len(), 100);
        assert_eq!(oi.rows.len(), 100);

        let expected: BTreeSet<String> = (50..150).map(|i| format!("T{i:03}")).collect();
        let actual: BTreeSet<String> = funding.rows.iter().map(|r| r.token.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn ranking_sums_best_contracts_only() {
        let records = vec![
            // A's non-best contract would push it ahead if it were summed.
            rec("Deribit", "A", Some(10.0), None, None),
            rec("Deribit", "A", Some(9.0), None, None),
            rec("Deribit", "B", Some(12.0), None, None),
            rec("OKX (Futures)", "C", Some(6.0), None, None),
            rec("Deribit", "C", Some(6.0), None, None),
            rec("Deribit", "D", None, None, None),
        ];

        let best = best_per_pair(&records);

        assert_eq!(rank_tokens(&best, 10), vec!["B", "C", "A", "D"]);
        assert_eq!(rank_tokens(&best, 2), vec!["B", "C"]);
    }

    #[test]
    fn equal_sums_rank_by_token() {
        let records = vec![
            rec("Deribit", "ZEC", Some(5.0), None, None),
            rec("Deribit", "ADA", Some(5.0), None, None),
            rec("Deribit", "MKR", Some(5.0), None, None),
        ];

        let best = best_per_pair(&records);

        assert_eq!(rank_tokens(&best, 2), vec!["ADA", "MKR"]);
    }

    #[test]
    fn rows_and_columns_are_sorted() {
        let records = vec![
            rec("OKX (Futures)", "SOL", Some(3.0), Some(0.002), None),
            rec("Bybit (Futures)", "BTC", Some(1.0), Some(0.004), None),
            rec("Deribit", "ETH", Some(2.0), Some(0.006), None),
        ];

        let (funding, _) = build_tables(&records);

        assert_eq!(
            funding.columns,
            vec!["Bybit (Futures)", "Deribit", "OKX (Futures)"]
        );
        let tokens: Vec<_> = funding.rows.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(funding.rows[0].cells, vec!["0.0040%", "-", "-"]);
    }

    #[test]
    fn columns_survive_the_token_limit() {
        let records = vec![
            rec("Deribit", "BTC", Some(100.0), Some(0.01), None),
            rec("DMEX", "TINY", Some(1.0), Some(0.01), None),
        ];

        let (funding, _) = build_tables_with_limit(&records, 1);

        assert_eq!(funding.columns, vec!["DMEX", "Deribit"]);
        assert_eq!(funding.rows.len(), 1);
        assert_eq!(funding.rows[0].cells, vec!["-", "0.0100%"]);
    }

    #[test]
    fn missing_funding_renders_placeholder_without_signal() {
        let records = vec![rec("Deribit", "BTC", Some(1.0), None, Some(5.0))];

        let (funding, oi) = build_tables(&records);

        let cell = funding.cell("BTC", "Deribit").unwrap();
        assert_eq!(cell, "-");
        assert_eq!(classify_cell(cell), None);
        assert_eq!(oi.cell("BTC", "Deribit"), Some("$5"));
    }

    #[test]
    fn funding_cells_classify_after_formatting() {
        let records = vec![
            rec("Deribit", "BTC", Some(1.0), Some(0.0125), None),
            rec("Deribit", "ETH", Some(1.0), Some(-0.004), None),
        ];

        let (funding, _) = build_tables(&records);

        assert_eq!(
            funding.cell("BTC", "Deribit").and_then(classify_cell),
            Some(FundingSignal::Bearish)
        );
        assert_eq!(
            funding.cell("ETH", "Deribit").and_then(classify_cell),
            Some(FundingSignal::Bullish)
        );
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let (funding, oi) = build_tables(&[]);

        assert!(funding.columns.is_empty());
        assert!(funding.rows.is_empty());
        assert_eq!(oi, funding);
    }
}
