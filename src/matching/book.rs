use crate::models::Quote;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Quote history partitioned by currency and sorted by observation time.
///
/// Window lookups bound each scan with binary search instead of re-walking the
/// whole table once per trade per parameter combination.
#[derive(Debug, Clone, Default)]
pub struct QuoteBook {
    by_currency: HashMap<String, Vec<Quote>>,
}

impl QuoteBook {
    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        let mut by_currency: HashMap<String, Vec<Quote>> = HashMap::new();
        for quote in quotes {
            by_currency
                .entry(quote.currency.clone())
                .or_default()
                .push(quote);
        }
        for series in by_currency.values_mut() {
            series.sort_by_key(|q| q.observed_at);
        }
        Self { by_currency }
    }

    /// All quotes for `currency` observed in `[from, to]`, inclusive both ends.
    /// Unknown currencies and inverted ranges yield an empty slice.
    pub fn range(&self, currency: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> &[Quote] {
        if from > to {
            return &[];
        }
        let Some(series) = self.by_currency.get(currency) else {
            return &[];
        };
        let start = series.partition_point(|q| q.observed_at < from);
        let end = series.partition_point(|q| q.observed_at <= to);
        &series[start..end]
    }

    /// Latest observation across all currencies, if any
    pub fn latest_observed_at(&self) -> Option<DateTime<Utc>> {
        self.by_currency
            .values()
            .filter_map(|series| series.last())
            .map(|q| q.observed_at)
            .max()
    }

    pub fn len(&self) -> usize {
        self.by_currency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_currency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn quote(currency: &str, price: f64, at: &str) -> Quote {
        Quote::new(currency, price, ts(at)).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_both_ends() {
        let book = QuoteBook::from_quotes(vec![
            quote("USD", 1300.0, "2024-11-01 09:00:00"),
            quote("USD", 1301.0, "2024-11-02 09:00:00"),
            quote("USD", 1302.0, "2024-11-03 09:00:00"),
        ]);

        let hits = book.range(
            "USD",
            ts("2024-11-01 09:00:00"),
            ts("2024-11-02 09:00:00"),
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].base_price, 1300.0);
        assert_eq!(hits[1].base_price, 1301.0);
    }

    #[test]
    fn test_range_sorts_unordered_input() {
        let book = QuoteBook::from_quotes(vec![
            quote("USD", 1302.0, "2024-11-03 09:00:00"),
            quote("USD", 1300.0, "2024-11-01 09:00:00"),
            quote("USD", 1301.0, "2024-11-02 09:00:00"),
        ]);

        let hits = book.range(
            "USD",
            ts("2024-11-01 00:00:00"),
            ts("2024-11-03 23:59:59"),
        );
        let prices: Vec<f64> = hits.iter().map(|q| q.base_price).collect();
        assert_eq!(prices, vec![1300.0, 1301.0, 1302.0]);
    }

    #[test]
    fn test_range_single_instant() {
        let at = ts("2024-11-01 09:00:00");
        let book = QuoteBook::from_quotes(vec![
            quote("USD", 1300.0, "2024-11-01 09:00:00"),
            quote("USD", 1301.0, "2024-11-01 09:00:01"),
        ]);
        let hits = book.range("USD", at, at);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].base_price, 1300.0);
    }

    #[test]
    fn test_range_unknown_currency_and_inverted_bounds() {
        let at = ts("2024-11-01 09:00:00");
        let book = QuoteBook::from_quotes(vec![quote("USD", 1300.0, "2024-11-01 09:00:00")]);
        assert!(book.range("JPY", at, at + Duration::days(1)).is_empty());
        assert!(book.range("USD", at + Duration::days(1), at).is_empty());
    }

    #[test]
    fn test_currencies_do_not_bleed_into_each_other() {
        let book = QuoteBook::from_quotes(vec![
            quote("USD", 1300.0, "2024-11-01 09:00:00"),
            quote("JPY", 910.0, "2024-11-01 09:00:00"),
        ]);
        let hits = book.range(
            "USD",
            ts("2024-11-01 00:00:00"),
            ts("2024-11-01 23:59:59"),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].currency, "USD");
    }

    #[test]
    fn test_latest_observed_at() {
        assert_eq!(QuoteBook::default().latest_observed_at(), None);

        let book = QuoteBook::from_quotes(vec![
            quote("USD", 1300.0, "2024-11-01 09:00:00"),
            quote("JPY", 910.0, "2024-11-05 09:00:00"),
        ]);
        assert_eq!(book.latest_observed_at(), Some(ts("2024-11-05 09:00:00")));
    }
}
