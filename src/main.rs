use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use fxtarget::aggregate::{compute_profit, AnalysisReport};
use fxtarget::db::PgSource;
use fxtarget::matching::{match_trades, MatchParams, QuoteBook};
use fxtarget::models::{Quote, Trade};
use fxtarget::sweep::{self, CancelToken, SweepAccumulator};
use fxtarget::{export, ingest};
use fxtarget::Result;
use std::path::PathBuf;

/// The exchange history is recorded in KST; CSV feeds store UTC
const DEFAULT_TZ_OFFSET_HOURS: i64 = 9;

#[derive(Parser)]
#[command(
    name = "fxtarget",
    about = "Backtest a target-price strategy over currency exchange history"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match trades against quote history for one parameter set
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        period: PeriodArgs,
        /// Days of quote history to search after each trade
        #[arg(long, default_value_t = 1)]
        window: i64,
        /// Target offset below the trade price for buy orders
        #[arg(long, default_value_t = 1.0)]
        buy_adjustment: f64,
        /// Target offset above the trade price for sell orders
        #[arg(long, default_value_t = 1.0)]
        sell_adjustment: f64,
        /// Write per-trade results to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write the report to this JSON file
        #[arg(long)]
        export_report: Option<PathBuf>,
    },
    /// Evaluate every (window, adjustment) combination up to the given bounds
    Sweep {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        period: PeriodArgs,
        /// Largest window to test, in days
        #[arg(long, default_value_t = 30)]
        max_window: i64,
        /// Largest whole-number adjustment to test
        #[arg(long, default_value_t = 10.0)]
        max_adjustment: f64,
        /// Write one summary row per combination to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write the per-currency breakdown of every combination to this CSV file
        #[arg(long)]
        export_breakdown: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Quote history CSV (currency, basePrice, observedAt)
    #[arg(long)]
    quotes: Option<PathBuf>,
    /// Trade history CSV (currencyCode, currencyCode0, price, isBuyOrder, amount, executedAt)
    #[arg(long)]
    trades: Option<PathBuf>,
    /// Load both tables from Postgres instead of CSV (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
    /// Hours to shift CSV timestamps into the exchange-local clock
    #[arg(long, default_value_t = DEFAULT_TZ_OFFSET_HOURS)]
    tz_offset: i64,
    /// Restrict the analysis to these currency codes
    #[arg(long, value_delimiter = ',')]
    currencies: Vec<String>,
}

#[derive(Args)]
struct PeriodArgs {
    /// First trade date to analyze (defaults to a week before the latest data)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last trade date to analyze (defaults to the latest data)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            source,
            period,
            window,
            buy_adjustment,
            sell_adjustment,
            export,
            export_report,
        } => {
            let (book, trades) = load_tables(&source).await?;
            let (period_start, period_end) = resolve_period(&period, &book, &trades)?;

            tracing::info!(
                "Analyzing {} trades from {} to {} (window {}d, buy -{}, sell +{})",
                trades.len(),
                period_start,
                period_end,
                window,
                buy_adjustment,
                sell_adjustment
            );

            let params = MatchParams {
                period_start,
                period_end,
                buy_adjustment,
                sell_adjustment,
                window_days: window,
            };
            let (results, matched_quotes) = match_trades(&book, &trades, &params);

            let report = AnalysisReport::from_results(&results);
            report.print_report();

            // Each side priced with its own adjustment
            let buy = compute_profit(
                &results,
                buy_adjustment,
                period_start,
                period_end,
                window,
            )
            .buy;
            let sell = compute_profit(
                &results,
                sell_adjustment,
                period_start,
                period_end,
                window,
            )
            .sell;

            println!("💰 NOTIONAL PROFIT");
            println!(
                "  Buy : {:>4} trades, volume {:>12.2}, profit {:>12.2}",
                buy.rows.len(),
                buy.total_volume,
                buy.total_profit
            );
            println!(
                "  Sell: {:>4} trades, volume {:>12.2}, profit {:>12.2}",
                sell.rows.len(),
                sell.total_volume,
                sell.total_profit
            );
            println!("\n  {} quote hits across all matched trades\n", matched_quotes.len());

            if let Some(path) = export {
                export::write_match_results_csv(&results, &path)?;
            }
            if let Some(path) = export_report {
                export::write_report_json(&report, &path)?;
            }
        }

        Command::Sweep {
            source,
            period,
            max_window,
            max_adjustment,
            export,
            export_breakdown,
        } => {
            let (book, trades) = load_tables(&source).await?;
            let (period_start, period_end) = resolve_period(&period, &book, &trades)?;

            let cancel = CancelToken::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, finishing the current window row");
                    ctrl_c_cancel.cancel();
                }
            });

            let cells = tokio::task::spawn_blocking({
                let cancel = cancel.clone();
                move || {
                    sweep::sweep_cells(
                        &book,
                        &trades,
                        period_start,
                        period_end,
                        max_window,
                        max_adjustment,
                        &cancel,
                    )
                }
            })
            .await?;

            let mut accumulator = SweepAccumulator::new();
            accumulator.absorb(cells);

            let rows = accumulator.rows();
            sweep::print_top_rows(&rows, 20);

            if let Some(path) = export {
                export::write_sweep_rows_csv(&rows, &path)?;
            }
            if let Some(path) = export_breakdown {
                export::write_sweep_breakdown_csv(accumulator.cells(), &path)?;
            }
        }
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("fxtarget=info")
        .init();
}

async fn load_tables(source: &SourceArgs) -> Result<(QuoteBook, Vec<Trade>)> {
    let (quotes, trades) = match (&source.quotes, &source.trades) {
        (Some(quote_path), Some(trade_path)) => {
            let quotes = ingest::load_quotes_csv(quote_path, source.tz_offset)?;
            let trades = ingest::load_trades_csv(trade_path, source.tz_offset)?;
            (quotes, trades)
        }
        _ => {
            let url = source
                .database_url
                .clone()
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or("pass --quotes/--trades CSV paths or --database-url")?;
            let db = PgSource::connect(&url).await?;
            (db.load_quotes().await?, db.load_trades().await?)
        }
    };

    let quotes: Vec<Quote> = ingest::filter_quote_currencies(quotes, &source.currencies);
    let trades = ingest::filter_trade_currencies(trades, &source.currencies);

    Ok((QuoteBook::from_quotes(quotes), trades))
}

fn resolve_period(
    period: &PeriodArgs,
    book: &QuoteBook,
    trades: &[Trade],
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let explicit_start = period.from.map(day_start);
    let explicit_end = period.to.map(day_end);

    if let (Some(start), Some(end)) = (explicit_start, explicit_end) {
        return Ok((start, end));
    }

    let (derived_start, derived_end) = ingest::default_period(book.latest_observed_at(), trades)
        .ok_or("no data available to derive an analysis period; pass --from/--to")?;

    Ok((
        explicit_start.unwrap_or(derived_start),
        explicit_end.unwrap_or(derived_end),
    ))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
}
