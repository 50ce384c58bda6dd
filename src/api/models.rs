use crate::pipeline::DisplayTable;
use crate::pipeline::format::{FundingSignal, classify_cell};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RowView {
    pub token: String,
    pub cells: Vec<String>,
    /// Funding table only: one entry per cell, `null` for placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<Option<FundingSignal>>>,
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<RowView>,
}

impl TableView {
    pub fn plain(table: DisplayTable) -> Self {
        Self::build(table, false)
    }

    /// Attaches a color classification to every formatted funding cell.
    pub fn funding(table: DisplayTable) -> Self {
        Self::build(table, true)
    }

    fn build(table: DisplayTable, classify: bool) -> Self {
        let rows = table
            .rows
            .into_iter()
            .map(|row| {
                let signals = classify
                    .then(|| row.cells.iter().map(|c| classify_cell(c)).collect());
                RowView {
                    token: row.token,
                    cells: row.cells,
                    signals,
                }
            })
            .collect();

        Self {
            columns: table.columns,
            rows,
        }
    }
}

/// Response for GET /api/tables
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    /// `None` when the snapshot held no allow-listed records.
    pub fetched_at: Option<DateTime<Utc>>,
    pub funding: TableView,
    pub open_interest: TableView,
}
