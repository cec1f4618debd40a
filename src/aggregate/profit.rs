use crate::models::{Direction, MatchResult, TradeKey};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One matched trade's contribution to the profit total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfitRow {
    pub currency: String,
    pub direction: Direction,
    pub executed_at: DateTime<Utc>,
    pub amount: f64,
    pub profit: f64,
}

/// Profit rows and totals for one side of the book
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfitLeg {
    pub rows: Vec<ProfitRow>,
    pub total_volume: f64,
    pub total_profit: f64,
}

/// Buy/sell split of the trade-level profit estimate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfitSummary {
    pub buy: ProfitLeg,
    pub sell: ProfitLeg,
}

/// Estimate profit for the trades that reached their target in a period.
///
/// Each matched trade contributes `amount * adjustment`. This is a notional
/// model: the actual fill price and execution costs are not part of it.
/// Trades are deduplicated by their natural key first, and only executions
/// inside `[period_start, period_end + window]` count.
pub fn compute_profit(
    results: &[MatchResult],
    adjustment: f64,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    window_days: i64,
) -> ProfitSummary {
    let horizon = period_end + Duration::days(window_days);
    let mut seen: HashSet<TradeKey> = HashSet::new();
    let mut summary = ProfitSummary::default();

    for result in results {
        if !result.found
            || result.executed_at < period_start
            || result.executed_at > horizon
            || !seen.insert(result.key())
        {
            continue;
        }

        let row = ProfitRow {
            currency: result.currency.clone(),
            direction: result.direction,
            executed_at: result.executed_at,
            amount: result.amount,
            profit: result.amount * adjustment,
        };

        let leg = match result.direction {
            Direction::Buy => &mut summary.buy,
            Direction::Sell => &mut summary.sell,
        };
        leg.total_volume += row.amount;
        leg.total_profit += row.profit;
        leg.rows.push(row);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn result(
        direction: Direction,
        found: bool,
        amount: f64,
        executed_at: DateTime<Utc>,
    ) -> MatchResult {
        MatchResult {
            currency: "USD".to_string(),
            direction,
            original_price: 1300.0,
            target_price: 1295.0,
            found,
            match_count: usize::from(found),
            amount,
            executed_at,
        }
    }

    #[test]
    fn test_profit_splits_by_direction() {
        let at = ts("2024-11-01 09:00:00");
        let results = vec![
            result(Direction::Buy, true, 100.0, at),
            result(Direction::Buy, true, 50.0, at + Duration::hours(1)),
            result(Direction::Sell, true, 200.0, at + Duration::hours(2)),
        ];

        let summary = compute_profit(
            &results,
            2.0,
            ts("2024-11-01 00:00:00"),
            ts("2024-11-30 23:59:59"),
            1,
        );

        assert_eq!(summary.buy.rows.len(), 2);
        assert!((summary.buy.total_volume - 150.0).abs() < f64::EPSILON);
        assert!((summary.buy.total_profit - 300.0).abs() < f64::EPSILON);

        assert_eq!(summary.sell.rows.len(), 1);
        assert!((summary.sell.total_volume - 200.0).abs() < f64::EPSILON);
        assert!((summary.sell.total_profit - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unmatched_trades_earn_nothing() {
        let at = ts("2024-11-01 09:00:00");
        let results = vec![result(Direction::Buy, false, 100.0, at)];

        let summary = compute_profit(
            &results,
            2.0,
            ts("2024-11-01 00:00:00"),
            ts("2024-11-30 23:59:59"),
            1,
        );

        assert!(summary.buy.rows.is_empty());
        assert_eq!(summary.buy.total_profit, 0.0);
    }

    #[test]
    fn test_window_extends_the_execution_cutoff() {
        let period_start = ts("2024-11-01 00:00:00");
        let period_end = ts("2024-11-10 23:59:59");

        // Executed after period_end but inside period_end + 3d
        let late = result(Direction::Sell, true, 100.0, period_end + Duration::days(2));
        // Executed past even the extended horizon
        let too_late = result(Direction::Sell, true, 50.0, period_end + Duration::days(4));

        let summary = compute_profit(&[late, too_late], 1.0, period_start, period_end, 3);

        assert_eq!(summary.sell.rows.len(), 1);
        assert!((summary.sell.total_volume - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_trades_collapse_before_summing() {
        let at = ts("2024-11-01 09:00:00");
        let row = result(Direction::Buy, true, 100.0, at);
        let results = vec![row.clone(), row.clone(), row];

        let summary = compute_profit(
            &results,
            5.0,
            ts("2024-11-01 00:00:00"),
            ts("2024-11-30 23:59:59"),
            1,
        );

        assert_eq!(summary.buy.rows.len(), 1);
        assert!((summary.buy.total_profit - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_results_yield_default_summary() {
        let summary = compute_profit(
            &[],
            2.0,
            ts("2024-11-01 00:00:00"),
            ts("2024-11-30 23:59:59"),
            1,
        );
        assert_eq!(summary, ProfitSummary::default());
    }
}
