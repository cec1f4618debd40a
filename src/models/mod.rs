use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JPY is quoted per 100 units; raw trade amounts carry that lot size and are
/// floor-divided by it before any volume or profit math. Other currencies are
/// quoted per unit and pass through unchanged.
const JPY_LOT_SIZE: f64 = 100.0;

/// A single observed exchange-rate tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub currency: String,
    pub base_price: f64,
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        currency: impl Into<String>,
        base_price: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let currency = currency.into();
        if currency.is_empty() {
            return Err(ValidationError::EmptyCurrency);
        }
        if base_price <= 0.0 {
            return Err(ValidationError::NonPositivePrice {
                currency,
                price: base_price,
            });
        }
        Ok(Self {
            currency,
            base_price,
            observed_at,
        })
    }
}

/// Order direction
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

/// An executed order, normalized for analysis.
///
/// `currency` is the non-KRW leg of the traded pair and `amount` has lot-size
/// normalization already applied. Both happen in [`Trade::from_order`], so code
/// downstream never sees raw exchange rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub currency: String,
    pub direction: Direction,
    pub price: f64,
    pub amount: f64,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Build a trade from the raw order columns the exchange exports.
    ///
    /// Quoted pairs carry two codes: when the base leg is KRW the counter code
    /// identifies the traded currency, otherwise the base code does. JPY
    /// amounts arrive in lots of 100 and are floor-divided down to units.
    pub fn from_order(
        currency_code: &str,
        currency_code0: &str,
        is_buy_order: bool,
        price: f64,
        raw_amount: f64,
        executed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let currency = if currency_code == "KRW" {
            currency_code0.to_string()
        } else {
            currency_code.to_string()
        };
        if currency.is_empty() {
            return Err(ValidationError::EmptyCurrency);
        }
        if price <= 0.0 {
            return Err(ValidationError::NonPositivePrice {
                currency,
                price,
            });
        }

        let amount = lot_normalize(&currency, raw_amount);
        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount { currency, amount });
        }

        Ok(Self {
            currency,
            direction: if is_buy_order {
                Direction::Buy
            } else {
                Direction::Sell
            },
            price,
            amount,
            executed_at,
        })
    }
}

/// Scale a raw order amount down by the currency's quote lot size.
pub fn lot_normalize(currency: &str, raw_amount: f64) -> f64 {
    if currency == "JPY" {
        (raw_amount / JPY_LOT_SIZE).floor()
    } else {
        raw_amount
    }
}

/// Outcome of the target-price search for one trade under one parameter set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub currency: String,
    pub direction: Direction,
    pub original_price: f64,
    pub target_price: f64,
    pub found: bool,
    pub match_count: usize,
    pub amount: f64,
    pub executed_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn key(&self) -> TradeKey {
        TradeKey {
            currency: self.currency.clone(),
            executed_at: self.executed_at,
            amount_bits: self.amount.to_bits(),
        }
    }
}

/// Natural identity of a trade: the exchange export carries no order id, so
/// (currency, executedAt, amount) stands in for one. The amount participates
/// via its bit pattern to keep the key `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradeKey {
    pub currency: String,
    pub executed_at: DateTime<Utc>,
    amount_bits: u64,
}

/// One quote that satisfied a trade's target condition, kept for qualitative
/// inspection (time-to-match, distribution). Aggregate counts come from
/// [`MatchResult`], never from these rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedQuote {
    pub currency: String,
    pub base_price: f64,
    pub observed_at: DateTime<Utc>,
    pub trade_executed_at: DateTime<Utc>,
    pub trade_price: f64,
    pub amount: f64,
    pub direction: Direction,
}

/// A row that failed validation at the ingestion boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("empty currency code")]
    EmptyCurrency,
    #[error("non-positive price {price} for {currency}")]
    NonPositivePrice { currency: String, price: f64 },
    #[error("non-positive amount {amount} for {currency} after lot normalization")]
    NonPositiveAmount { currency: String, amount: f64 },
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

    #[test]
    fn test_krw_base_resolves_to_counter_code() {
        let trade =
            Trade::from_order("KRW", "USD", true, 1300.0, 100.0, ts("2024-11-01 09:00:00"))
                .unwrap();
        assert_eq!(trade.currency, "USD");
        assert_eq!(trade.direction, Direction::Buy);
    }

    #[test]
    fn test_non_krw_base_keeps_own_code() {
        let trade =
            Trade::from_order("USD", "KRW", false, 1300.0, 100.0, ts("2024-11-01 09:00:00"))
                .unwrap();
        assert_eq!(trade.currency, "USD");
        assert_eq!(trade.direction, Direction::Sell);
    }

    #[test]
    fn test_jpy_lot_normalization() {
        let trade =
            Trade::from_order("KRW", "JPY", true, 910.0, 10000.0, ts("2024-11-01 09:00:00"))
                .unwrap();
        assert_eq!(trade.amount, 100.0);
    }

    #[test]
    fn test_usd_amount_passes_through() {
        let trade =
            Trade::from_order("KRW", "USD", true, 1300.0, 10000.0, ts("2024-11-01 09:00:00"))
                .unwrap();
        assert_eq!(trade.amount, 10000.0);
    }

    #[test]
    fn test_jpy_sub_lot_amount_rejected() {
        // 50 raw units floor to zero lots
        let err =
            Trade::from_order("KRW", "JPY", true, 910.0, 50.0, ts("2024-11-01 09:00:00"))
                .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveAmount { .. }));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let err = Trade::from_order("KRW", "USD", true, 0.0, 100.0, ts("2024-11-01 09:00:00"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositivePrice { .. }));

        let err = Quote::new("USD", -1.0, ts("2024-11-01 09:00:00")).unwrap_err();
        assert!(matches!(err, ValidationError::NonPositivePrice { .. }));
    }

    #[test]
    fn test_trade_key_equality() {
        let at = ts("2024-11-01 09:00:00");
        let a = MatchResult {
            currency: "USD".to_string(),
            direction: Direction::Buy,
            original_price: 1300.0,
            target_price: 1295.0,
            found: true,
            match_count: 2,
            amount: 100.0,
            executed_at: at,
        };
        let mut b = a.clone();
        // Same trade matched under a different parameter set
        b.target_price = 1290.0;
        b.match_count = 0;
        b.found = false;
        assert_eq!(a.key(), b.key());

        let mut c = a.clone();
        c.amount = 100.5;
        assert_ne!(a.key(), c.key());
    }
}
