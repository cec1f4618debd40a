use crate::models::{Direction, Quote, Trade};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates synthetic quote and trade history for demos and tests
pub struct SyntheticDataGenerator {
    rng: StdRng,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random-walk quote series for one currency.
    ///
    /// Each tick drifts up to ±0.4% from the previous one, floored at half the
    /// base price so the series never goes non-positive.
    pub fn quote_walk(
        &mut self,
        currency: &str,
        base_price: f64,
        start: DateTime<Utc>,
        num_quotes: usize,
        interval_minutes: i64,
    ) -> Vec<Quote> {
        let mut price = base_price;
        let mut quotes = Vec::with_capacity(num_quotes);

        for i in 0..num_quotes {
            let drift = self.rng.gen_range(-0.004..0.004);
            price = (price * (1.0 + drift)).max(base_price * 0.5);
            quotes.push(Quote {
                currency: currency.to_string(),
                base_price: price,
                observed_at: start + Duration::minutes(i as i64 * interval_minutes),
            });
        }

        quotes
    }

    /// Generate trades executed at randomly chosen ticks of a quote walk.
    ///
    /// Each trade takes its execution time from a random quote, a price
    /// jittered ±0.2% around that quote, a lot-sized amount and a coin-flip
    /// direction.
    pub fn trades_for(&mut self, quotes: &[Quote], num_trades: usize) -> Vec<Trade> {
        if quotes.is_empty() {
            return Vec::new();
        }

        let mut trades = Vec::with_capacity(num_trades);
        for _ in 0..num_trades {
            let tick = &quotes[self.rng.gen_range(0..quotes.len())];
            let jitter = self.rng.gen_range(-0.002..0.002);
            trades.push(Trade {
                currency: tick.currency.clone(),
                direction: if self.rng.gen_bool(0.5) {
                    Direction::Buy
                } else {
                    Direction::Sell
                },
                price: tick.base_price * (1.0 + jitter),
                amount: self.rng.gen_range(1..=20) as f64 * 50.0,
                executed_at: tick.observed_at,
            });
        }

        trades
    }
}
