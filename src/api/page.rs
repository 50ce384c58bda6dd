//! Server-rendered HTML for the dashboard page.
//!
//! Two tabbed tables (funding rates and open interest) plus a static info
//! panel. Funding cells get a CSS class from their color classification.

use super::models::{TableView, TablesResponse};
use crate::pipeline::format::FundingSignal;

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; margin: 0; background: #0e1117; color: #fafafa; }
    header { padding: 16px 24px; border-bottom: 1px solid #262730; }
    main { display: flex; gap: 24px; padding: 16px 24px; }
    .content { flex: 1; min-width: 0; }
    aside { width: 260px; font-size: 14px; color: #a3a8b8; }
    .tabs { display: flex; gap: 8px; margin-bottom: 12px; }
    .tabs button { background: none; border: none; color: #a3a8b8; padding: 8px 12px; cursor: pointer; border-bottom: 2px solid transparent; }
    .tabs button.active { color: #fafafa; border-bottom-color: #ff4b4b; }
    .panel { display: none; }
    .panel.active { display: block; }
    .scroll { overflow: auto; max-height: 800px; width: 100%; }
    table { border-collapse: collapse; font-size: 13px; white-space: nowrap; }
    th, td { padding: 4px 10px; border-bottom: 1px solid #262730; text-align: right; }
    th:first-child, td:first-child { text-align: left; position: sticky; left: 0; background: #0e1117; }
    thead th { position: sticky; top: 0; background: #1a1c24; }
    td.bullish { color: #21c354; }
    td.bearish { color: #ff4b4b; }
    .muted { color: #6c7080; }
"#;

const SCRIPT: &str = r#"
    function showTab(id) {
        document.querySelectorAll('.panel').forEach(p => p.classList.toggle('active', p.id === id));
        document.querySelectorAll('.tabs button').forEach(b => b.classList.toggle('active', b.dataset.tab === id));
    }
"#;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn signal_class(signal: Option<FundingSignal>) -> &'static str {
    match signal {
        Some(FundingSignal::Bullish) => "bullish",
        Some(FundingSignal::Bearish) => "bearish",
        Some(FundingSignal::Neutral) | None => "",
    }
}

fn render_table(table: &TableView) -> String {
    if table.rows.is_empty() {
        return r#"<p class="muted">No data for the tracked exchanges.</p>"#.to_string();
    }

    let mut html = String::from("<div class=\"scroll\"><table><thead><tr><th>token</th>");
    for column in &table.columns {
        html.push_str(&format!("<th>{}</th>", html_escape(column)));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        html.push_str(&format!("<tr><td>{}</td>", html_escape(&row.token)));
        for (i, cell) in row.cells.iter().enumerate() {
            let signal = row.signals.as_ref().and_then(|s| s.get(i).copied().flatten());
            let class = signal_class(signal);
            if class.is_empty() {
                html.push_str(&format!("<td>{}</td>", html_escape(cell)));
            } else {
                html.push_str(&format!("<td class=\"{class}\">{}</td>", html_escape(cell)));
            }
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

pub fn render_dashboard(tables: &TablesResponse, top_tokens: usize) -> String {
    let fetched = tables
        .fetched_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Perps Dashboard</title>
<style>{STYLE}</style>
<script>{SCRIPT}</script>
</head>
<body>
<header><h1>📊 Perpetuals Dashboard</h1><span class="muted">Data fetched at {fetched}</span></header>
<main>
<div class="content">
  <div class="tabs">
    <button class="active" data-tab="funding" onclick="showTab('funding')">📈 Funding Rates</button>
    <button data-tab="open-interest" onclick="showTab('open-interest')">💰 Open Interest</button>
  </div>
  <section id="funding" class="panel active">
    <h2>Funding Rates (Top {top_tokens} Tokens)</h2>
    {funding}
  </section>
  <section id="open-interest" class="panel">
    <h2>Open Interest (Top {top_tokens} Tokens)</h2>
    {open_interest}
  </section>
</div>
<aside>
  <h3>About</h3>
  <p>Perpetual futures funding rates and open interest across major exchanges, from the CoinGecko derivatives listing.</p>
  <p>Each cell shows the highest-volume contract for that token on that exchange. Tokens are ranked by combined 24h volume.</p>
  <p><span style="color:#21c354">Green</span> funding is below 0.005%, <span style="color:#ff4b4b">red</span> is above 0.01%.</p>
</aside>
</main>
</body>
</html>"#,
        funding = render_table(&tables.funding),
        open_interest = render_table(&tables.open_interest),
    )
}

pub fn render_error(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Perps Dashboard</title><style>{STYLE}</style></head>
<body><header><h1>📊 Perpetuals Dashboard</h1></header>
<main><p>Failed to load market data: {}</p></main>
</body>
</html>"#,
        html_escape(message)
    )
}
