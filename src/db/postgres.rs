use crate::models::{Quote, Trade};
use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

/// Postgres source for the quote and trade tables.
///
/// The schema mirrors the exchange exports: `exchange_rates` holds one row per
/// observed tick, `trades` one row per executed order in its raw pair form.
/// Pair resolution and lot normalization happen here on the way out, the same
/// boundary the CSV loader applies them at.
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    /// Connect to Postgres
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("Connected to Postgres at {}", database_url);

        Ok(Self { pool })
    }

    /// Load every quote tick, oldest first
    pub async fn load_quotes(&self) -> Result<Vec<Quote>> {
        let rows = sqlx::query(
            r#"
            SELECT currency_code, base_price, created_at
            FROM exchange_rates
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            let currency: String = row.try_get("currency_code")?;
            let base_price: f64 = row.try_get("base_price")?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            quotes.push(Quote::new(currency, base_price, created_at)?);
        }

        tracing::info!("Loaded {} quotes from Postgres", quotes.len());
        Ok(quotes)
    }

    /// Load every executed order, oldest first
    pub async fn load_trades(&self) -> Result<Vec<Trade>> {
        let rows = sqlx::query(
            r#"
            SELECT currency_code, currency_code0, price, is_buy_order, amount, executed_at
            FROM trades
            ORDER BY executed_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            let currency_code: String = row.try_get("currency_code")?;
            let currency_code0: String = row.try_get("currency_code0")?;
            let price: f64 = row.try_get("price")?;
            let is_buy_order: i16 = row.try_get("is_buy_order")?;
            let amount: f64 = row.try_get("amount")?;
            let executed_at: DateTime<Utc> = row.try_get("executed_at")?;

            trades.push(Trade::from_order(
                &currency_code,
                &currency_code0,
                is_buy_order == 1,
                price,
                amount,
                executed_at,
            )?);
        }

        tracing::info!("Loaded {} trades from Postgres", trades.len());
        Ok(trades)
    }
}
