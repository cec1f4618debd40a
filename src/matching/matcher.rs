use crate::matching::book::QuoteBook;
use crate::models::{Direction, MatchResult, MatchedQuote, Trade};
use chrono::{DateTime, Duration, Utc};

/// Parameters for one matching pass
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub buy_adjustment: f64,
    pub sell_adjustment: f64,
    pub window_days: i64,
}

/// Run the target-price search for every trade executed inside the period.
///
/// Trades outside `[period_start, period_end]` are skipped up front. Each
/// surviving trade produces exactly one [`MatchResult`]; every quote that
/// satisfies its condition additionally produces a [`MatchedQuote`].
///
/// A buy order reaches its target when the market later quotes at or below
/// `price - buy_adjustment`; a sell order when it quotes at or above
/// `price + sell_adjustment`. Only quotes observed in
/// `[executed_at, executed_at + window_days]` (inclusive both ends) count, so
/// `window_days = 0` collapses the search to same-timestamp quotes. Every
/// per-trade window lies inside `[period_start, period_end + window_days]`,
/// so the indexed lookup already enforces the batch-level quote bounds.
pub fn match_trades(
    book: &QuoteBook,
    trades: &[Trade],
    params: &MatchParams,
) -> (Vec<MatchResult>, Vec<MatchedQuote>) {
    let mut results = Vec::new();
    let mut matched = Vec::new();

    for trade in trades {
        if trade.executed_at < params.period_start || trade.executed_at > params.period_end {
            continue;
        }

        let target_price = match trade.direction {
            Direction::Buy => trade.price - params.buy_adjustment,
            Direction::Sell => trade.price + params.sell_adjustment,
        };

        let window_end = trade.executed_at + Duration::days(params.window_days);
        let candidates = book.range(&trade.currency, trade.executed_at, window_end);

        let mut match_count = 0usize;
        for quote in candidates {
            let reached = match trade.direction {
                Direction::Buy => quote.base_price <= target_price,
                Direction::Sell => quote.base_price >= target_price,
            };
            if reached {
                match_count += 1;
                matched.push(MatchedQuote {
                    currency: trade.currency.clone(),
                    base_price: quote.base_price,
                    observed_at: quote.observed_at,
                    trade_executed_at: trade.executed_at,
                    trade_price: trade.price,
                    amount: trade.amount,
                    direction: trade.direction,
                });
            }
        }

        results.push(MatchResult {
            currency: trade.currency.clone(),
            direction: trade.direction,
            original_price: trade.price,
            target_price,
            found: match_count > 0,
            match_count,
            amount: trade.amount,
            executed_at: trade.executed_at,
        });
    }

    tracing::debug!(
        "Matched {} of {} trades ({} quote hits)",
        results.iter().filter(|r| r.found).count(),
        results.len(),
        matched.len()
    );

    (results, matched)
}
