use crate::models::{Quote, Trade, ValidationError};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Timestamp format both exchange exports use
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ingestion failure. A single bad row fails the whole batch, carrying the
/// data row number (1-based, header excluded) so the export can be fixed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("bad timestamp {value:?} at row {row} of {}", .path.display())]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("invalid row {row} of {}: {source}", .path.display())]
    InvalidRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Deserialize)]
struct QuoteRecord {
    currency: String,
    #[serde(rename = "basePrice")]
    base_price: f64,
    #[serde(rename = "observedAt")]
    observed_at: String,
}

#[derive(Debug, Deserialize)]
struct TradeRecord {
    #[serde(rename = "currencyCode")]
    currency_code: String,
    #[serde(rename = "currencyCode0")]
    currency_code0: String,
    price: f64,
    #[serde(rename = "isBuyOrder")]
    is_buy_order: u8,
    amount: f64,
    #[serde(rename = "executedAt")]
    executed_at: String,
}

/// Load the quote table from CSV.
///
/// The feed stores timestamps in UTC; `tz_offset_hours` shifts them into the
/// exchange-local clock the trade history uses (+9 for KST).
pub fn load_quotes_csv(path: &Path, tz_offset_hours: i64) -> Result<Vec<Quote>, IngestError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut quotes = Vec::new();
    for (i, record) in reader.deserialize::<QuoteRecord>().enumerate() {
        let row = i + 1;
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let observed_at = parse_timestamp(&record.observed_at, tz_offset_hours)
            .ok_or_else(|| IngestError::Timestamp {
                path: path.to_path_buf(),
                row,
                value: record.observed_at.clone(),
            })?;

        let quote = Quote::new(record.currency, record.base_price, observed_at).map_err(
            |source| IngestError::InvalidRow {
                path: path.to_path_buf(),
                row,
                source,
            },
        )?;
        quotes.push(quote);
    }

    tracing::info!("Loaded {} quotes from {}", quotes.len(), path.display());
    Ok(quotes)
}

/// Load the trade table from CSV. Pair resolution and lot normalization are
/// applied here, so the returned trades are ready for matching.
pub fn load_trades_csv(path: &Path, tz_offset_hours: i64) -> Result<Vec<Trade>, IngestError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut trades = Vec::new();
    for (i, record) in reader.deserialize::<TradeRecord>().enumerate() {
        let row = i + 1;
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let executed_at = parse_timestamp(&record.executed_at, tz_offset_hours)
            .ok_or_else(|| IngestError::Timestamp {
                path: path.to_path_buf(),
                row,
                value: record.executed_at.clone(),
            })?;

        let trade = Trade::from_order(
            &record.currency_code,
            &record.currency_code0,
            record.is_buy_order == 1,
            record.price,
            record.amount,
            executed_at,
        )
        .map_err(|source| IngestError::InvalidRow {
            path: path.to_path_buf(),
            row,
            source,
        })?;
        trades.push(trade);
    }

    tracing::info!("Loaded {} trades from {}", trades.len(), path.display());
    Ok(trades)
}

fn parse_timestamp(value: &str, tz_offset_hours: i64) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc() + Duration::hours(tz_offset_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "quotes.csv",
            "currency,basePrice,observedAt\n\
             USD,1300.5,2024-11-01 00:00:00\n\
             JPY,910.2,2024-11-01 00:05:00\n",
        );

        let quotes = load_quotes_csv(&path, 9).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].currency, "USD");
        assert_eq!(quotes[0].base_price, 1300.5);
        // UTC 00:00 shifted to 09:00 exchange time
        assert_eq!(
            quotes[0].observed_at,
            parse_timestamp("2024-11-01 09:00:00", 0).unwrap()
        );
    }

    #[test]
    fn test_load_trades_resolves_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "trades.csv",
            "currencyCode,currencyCode0,price,isBuyOrder,amount,executedAt\n\
             KRW,USD,1300.0,1,500.0,2024-11-01 03:00:00\n\
             KRW,JPY,910.0,0,10000.0,2024-11-01 04:00:00\n",
        );

        let trades = load_trades_csv(&path, 9).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].currency, "USD");
        assert_eq!(trades[0].direction, Direction::Buy);
        assert_eq!(trades[1].currency, "JPY");
        assert_eq!(trades[1].direction, Direction::Sell);
        assert_eq!(trades[1].amount, 100.0);
    }

    #[test]
    fn test_bad_row_fails_the_batch_with_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "quotes.csv",
            "currency,basePrice,observedAt\n\
             USD,1300.5,2024-11-01 00:00:00\n\
             USD,-3.0,2024-11-01 00:05:00\n",
        );

        let err = load_quotes_csv(&path, 0).unwrap_err();
        match err {
            IngestError::InvalidRow { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_timestamp_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "quotes.csv",
            "currency,basePrice,observedAt\nUSD,1300.5,yesterday\n",
        );

        let err = load_quotes_csv(&path, 0).unwrap_err();
        assert!(matches!(err, IngestError::Timestamp { row: 1, .. }));
    }

    #[test]
    fn test_missing_file_is_a_csv_error() {
        let err = load_quotes_csv(Path::new("/nonexistent/quotes.csv"), 0).unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }));
    }
}
