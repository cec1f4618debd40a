pub mod loader;

pub use loader::{load_quotes_csv, load_trades_csv, IngestError};

use crate::models::{Quote, Trade};
use chrono::{DateTime, Duration, Utc};

/// Keep only quotes in the selected currency set. An empty selection keeps
/// everything.
pub fn filter_quote_currencies(quotes: Vec<Quote>, keep: &[String]) -> Vec<Quote> {
    if keep.is_empty() {
        return quotes;
    }
    quotes
        .into_iter()
        .filter(|q| keep.iter().any(|c| c == &q.currency))
        .collect()
}

/// Keep only trades in the selected currency set. An empty selection keeps
/// everything.
pub fn filter_trade_currencies(trades: Vec<Trade>, keep: &[String]) -> Vec<Trade> {
    if keep.is_empty() {
        return trades;
    }
    trades
        .into_iter()
        .filter(|t| keep.iter().any(|c| c == &t.currency))
        .collect()
}

/// Default analysis period: the week ending at the latest timestamp either
/// table carries. `None` when both tables are empty.
pub fn default_period(
    latest_quote: Option<DateTime<Utc>>,
    trades: &[Trade],
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let latest_trade = trades.iter().map(|t| t.executed_at).max();
    let latest = match (latest_quote, latest_trade) {
        (Some(q), Some(t)) => q.max(t),
        (Some(q), None) => q,
        (None, Some(t)) => t,
        (None, None) => return None,
    };
    Some((latest - Duration::days(7), latest))
}
