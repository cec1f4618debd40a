use crate::aggregate::{
    aggregate_by_currency_and_direction, compute_profit, dedup_results, success_rate, AggregateRow,
};
use crate::matching::{match_trades, MatchParams, QuoteBook};
use crate::models::Trade;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Summary of one (window, adjustment) grid cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepRow {
    pub window_days: i64,
    pub adjustment: f64,
    pub total_buy_volume: f64,
    pub total_buy_profit: f64,
    pub total_sell_volume: f64,
    pub total_sell_profit: f64,
    pub total_success_rate: f64,
}

/// One evaluated grid cell: the summary row plus its per-currency breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepCell {
    pub row: SweepRow,
    pub breakdown: Vec<AggregateRow>,
}

/// Cooperative stop signal, checked between grid cells
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Evaluate a single grid cell with the same adjustment on both sides.
///
/// The cell matches all trades, collapses duplicates, and derives the
/// per-(currency, side) breakdown with `total_volume * adjustment` as each
/// row's profit. Only the adjustment scales the breakdown profit; the buy/sell
/// totals come from the trade-level profit contract, which also applies the
/// window when cutting off executions.
pub fn evaluate_cell(
    book: &QuoteBook,
    trades: &[Trade],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    window_days: i64,
    adjustment: f64,
) -> SweepCell {
    let params = MatchParams {
        period_start,
        period_end,
        buy_adjustment: adjustment,
        sell_adjustment: adjustment,
        window_days,
    };

    let (results, _) = match_trades(book, trades, &params);
    let results = dedup_results(results);

    let mut breakdown = aggregate_by_currency_and_direction(&results);
    for row in &mut breakdown {
        row.total_profit = row.total_volume * adjustment;
    }

    let profit = compute_profit(&results, adjustment, period_start, period_end, window_days);

    let matched_trades = results.iter().filter(|r| r.found).count();

    SweepCell {
        row: SweepRow {
            window_days,
            adjustment,
            total_buy_volume: profit.buy.total_volume,
            total_buy_profit: profit.buy.total_profit,
            total_sell_volume: profit.sell.total_volume,
            total_sell_profit: profit.sell.total_profit,
            total_success_rate: success_rate(matched_trades, results.len()),
        },
        breakdown,
    }
}

/// Evaluate the full grid: windows `1..=max_window_days` outermost,
/// adjustments `1.0, 2.0, ..., max_adjustment` within each window.
///
/// Cells are independent, so the adjustment axis of each window row runs in
/// parallel; `collect` keeps the traversal order. The cancel token is checked
/// between window rows: a cancelled sweep returns the cells finished so far,
/// a completed one holds exactly one cell per requested combination.
pub fn sweep_cells(
    book: &QuoteBook,
    trades: &[Trade],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    max_window_days: i64,
    max_adjustment: f64,
    cancel: &CancelToken,
) -> Vec<SweepCell> {
    let adjustments: Vec<f64> = (1..=max_adjustment.floor() as i64)
        .map(|step| step as f64)
        .collect();

    tracing::info!(
        "Sweeping {} window x {} adjustment combinations over {} trades",
        max_window_days.max(0),
        adjustments.len(),
        trades.len()
    );

    let mut cells = Vec::with_capacity((max_window_days.max(0) as usize) * adjustments.len());

    for window_days in 1..=max_window_days {
        if cancel.is_cancelled() {
            tracing::info!(
                "Sweep cancelled after {} of {} window rows",
                window_days - 1,
                max_window_days
            );
            break;
        }

        let mut window_row: Vec<SweepCell> = adjustments
            .par_iter()
            .map(|&adjustment| {
                evaluate_cell(book, trades, period_start, period_end, window_days, adjustment)
            })
            .collect();
        cells.append(&mut window_row);
    }

    cells
}

/// Grid evaluation returning only the summary rows
pub fn run_sweep(
    book: &QuoteBook,
    trades: &[Trade],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    max_window_days: i64,
    max_adjustment: f64,
    cancel: &CancelToken,
) -> Vec<SweepRow> {
    sweep_cells(
        book,
        trades,
        period_start,
        period_end,
        max_window_days,
        max_adjustment,
        cancel,
    )
    .into_iter()
    .map(|cell| cell.row)
    .collect()
}

/// Print the best-performing combinations to stdout, ranked by combined
/// notional profit the way a sweep comparison is usually read
pub fn print_top_rows(rows: &[SweepRow], limit: usize) {
    let mut ranked: Vec<&SweepRow> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        let pa = a.total_buy_profit + a.total_sell_profit;
        let pb = b.total_buy_profit + b.total_sell_profit;
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║                 TOP SWEEP COMBINATIONS                ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");
    println!(
        "  {:>6} {:>6} {:>12} {:>12} {:>12} {:>12} {:>8}",
        "window", "adj", "buy vol", "buy profit", "sell vol", "sell profit", "rate"
    );
    for row in ranked.iter().take(limit) {
        println!(
            "  {:>6} {:>6.1} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>7.2}%",
            row.window_days,
            row.adjustment,
            row.total_buy_volume,
            row.total_buy_profit,
            row.total_sell_volume,
            row.total_sell_profit,
            row.total_success_rate
        );
    }
    if rows.len() > limit {
        println!("  ... {} more combinations", rows.len() - limit);
    }
    println!();
}

/// Caller-owned accumulation across repeated interactive sweeps.
///
/// The caller decides when to absorb a run and when to reset; nothing is
/// cached process-wide. Exact repeats (a cell re-run with an identical
/// outcome) collapse on absorb.
#[derive(Debug, Clone, Default)]
pub struct SweepAccumulator {
    cells: Vec<SweepCell>,
}

impl SweepAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, cells: Vec<SweepCell>) {
        for cell in cells {
            if !self.cells.contains(&cell) {
                self.cells.push(cell);
            }
        }
    }

    pub fn cells(&self) -> &[SweepCell] {
        &self.cells
    }

    pub fn rows(&self) -> Vec<SweepRow> {
        self.cells.iter().map(|cell| cell.row.clone()).collect()
    }

    pub fn reset(&mut self) {
        self.cells.clear();
    }
}
