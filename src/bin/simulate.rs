use chrono::{Duration, TimeZone, Utc};
use fxtarget::aggregate::AnalysisReport;
use fxtarget::matching::{match_trades, MatchParams, QuoteBook};
use fxtarget::sweep::{self, CancelToken};
use fxtarget::synthetic::SyntheticDataGenerator;
use fxtarget::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("fxtarget=info")
        .init();

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║           TARGET PRICE SIMULATION (SYNTHETIC)         ║");
    println!("╚═══════════════════════════════════════════════════════╝");

    let start = Utc
        .with_ymd_and_hms(2024, 11, 1, 9, 0, 0)
        .single()
        .ok_or("invalid simulation start time")?;

    // Two weeks of 5-minute ticks for the two most traded pairs
    let mut generator = SyntheticDataGenerator::new(42);
    let mut quotes = generator.quote_walk("USD", 1350.0, start, 4032, 5);
    quotes.extend(generator.quote_walk("JPY", 910.0, start, 4032, 5));

    let usd_quotes: Vec<_> = quotes
        .iter()
        .filter(|q| q.currency == "USD")
        .cloned()
        .collect();
    let jpy_quotes: Vec<_> = quotes
        .iter()
        .filter(|q| q.currency == "JPY")
        .cloned()
        .collect();

    let mut trades = generator.trades_for(&usd_quotes, 60);
    trades.extend(generator.trades_for(&jpy_quotes, 40));

    let period_start = start;
    let period_end = start + Duration::days(14);
    let book = QuoteBook::from_quotes(quotes);

    println!("\n  Quotes:  {}", book.len());
    println!("  Trades:  {}", trades.len());
    println!("  Period:  {} → {}", period_start, period_end);

    // Single-parameter pass first
    let params = MatchParams {
        period_start,
        period_end,
        buy_adjustment: 2.0,
        sell_adjustment: 2.0,
        window_days: 3,
    };
    let (results, _) = match_trades(&book, &trades, &params);
    AnalysisReport::from_results(&results).print_report();

    // Then the full grid
    let rows = sweep::run_sweep(
        &book,
        &trades,
        period_start,
        period_end,
        7,
        5.0,
        &CancelToken::new(),
    );
    sweep::print_top_rows(&rows, 10);

    Ok(())
}
