use serde::Serialize;

/// Rendered for any cell without a value.
pub const PLACEHOLDER: &str = "-";

const BULLISH_BELOW: f64 = 0.005;
const BEARISH_ABOVE: f64 = 0.01;

/// Color hint for a funding-rate cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingSignal {
    Bullish,
    Neutral,
    Bearish,
}

/// `0.0125` → `"0.0125%"`. The rate is already in percent.
pub fn format_funding(rate: Option<f64>) -> String {
    match rate.filter(|r| r.is_finite()) {
        Some(r) => format!("{r:.4}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// `1234567.4` → `"$1,234,567"`. Negative amounts render as `"$-1,234"`.
pub fn format_open_interest(amount: Option<f64>) -> String {
    let Some(amount) = amount.filter(|a| a.is_finite()) else {
        return PLACEHOLDER.to_string();
    };

    let rounded = format!("{amount:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };

    format!("${sign}{}", group_thousands(digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn parse_funding(cell: &str) -> Option<f64> {
    cell.strip_suffix('%')?.parse().ok()
}

pub fn parse_open_interest(cell: &str) -> Option<f64> {
    cell.strip_prefix('$')?.replace(',', "").parse().ok()
}

/// Bullish under 0.005%, bearish over 0.01%, neutral in between (both bounds inclusive).
pub fn classify_rate(rate: f64) -> FundingSignal {
    if rate < BULLISH_BELOW {
        FundingSignal::Bullish
    } else if rate > BEARISH_ABOVE {
        FundingSignal::Bearish
    } else {
        FundingSignal::Neutral
    }
}

/// Classifies a formatted funding cell; placeholders have no signal.
pub fn classify_cell(cell: &str) -> Option<FundingSignal> {
    parse_funding(cell).map(classify_rate)
}
