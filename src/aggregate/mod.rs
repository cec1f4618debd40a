pub mod profit;
pub mod report;

pub use profit::{compute_profit, ProfitLeg, ProfitRow, ProfitSummary};
pub use report::AnalysisReport;

use crate::models::{Direction, MatchResult, TradeKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Match statistics for one currency, optionally split by direction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateRow {
    pub currency: String,
    pub direction: Option<Direction>,
    pub total_trades: usize,
    pub matched_trades: usize,
    pub total_match_count: usize,
    pub success_rate: f64,
    pub total_volume: f64,
    /// Filled by the sweep driver (`total_volume * adjustment`); plain
    /// aggregation leaves it at zero.
    pub total_profit: f64,
}

pub fn aggregate_by_currency(results: &[MatchResult]) -> Vec<AggregateRow> {
    group(results, |_| None)
}

pub fn aggregate_by_currency_and_direction(results: &[MatchResult]) -> Vec<AggregateRow> {
    group(results, |r| Some(r.direction))
}

fn group(
    results: &[MatchResult],
    split: impl Fn(&MatchResult) -> Option<Direction>,
) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(String, Option<Direction>), Vec<&MatchResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry((result.currency.clone(), split(result)))
            .or_default()
            .push(result);
    }

    groups
        .into_iter()
        .map(|((currency, direction), rows)| {
            let total_trades = rows.len();
            let matched_trades = rows.iter().filter(|r| r.found).count();
            AggregateRow {
                currency,
                direction,
                total_trades,
                matched_trades,
                total_match_count: rows.iter().map(|r| r.match_count).sum(),
                success_rate: success_rate(matched_trades, total_trades),
                total_volume: rows.iter().map(|r| r.amount).sum(),
                total_profit: 0.0,
            }
        })
        .collect()
}

/// Percentage of matched trades, defined as 0 when there were no trades
pub fn success_rate(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (matched as f64 / total as f64) * 100.0
    }
}

/// Collapse repeats of the same trade, keeping the first occurrence.
///
/// Repeated sweep iterations and merged interactive runs can re-emit a trade;
/// (currency, executedAt, amount) stands in for the order id the exchange
/// export does not carry.
pub fn dedup_results(results: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut seen: HashSet<TradeKey> = HashSet::with_capacity(results.len());
    results.into_iter().filter(|r| seen.insert(r.key())).collect()
}
