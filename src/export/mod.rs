use crate::aggregate::{AggregateRow, AnalysisReport};
use crate::models::MatchResult;
use crate::sweep::{SweepCell, SweepRow};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

fn fmt_ts(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write per-trade match results to CSV
pub fn write_match_results_csv(results: &[MatchResult], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "currency",
        "direction",
        "originalPrice",
        "targetPrice",
        "found",
        "matchCount",
        "amount",
        "executedAt",
    ])?;

    for result in results {
        writer.write_record([
            result.currency.clone(),
            result.direction.to_string(),
            result.original_price.to_string(),
            result.target_price.to_string(),
            result.found.to_string(),
            result.match_count.to_string(),
            result.amount.to_string(),
            fmt_ts(result.executed_at),
        ])?;
    }

    writer.flush()?;
    tracing::info!("Wrote {} match results to {}", results.len(), path.display());
    Ok(())
}

/// Write aggregate statistics to CSV
pub fn write_aggregate_rows_csv(rows: &[AggregateRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "currency",
        "direction",
        "totalTrades",
        "matchedTrades",
        "totalMatchCount",
        "successRate",
        "totalVolume",
        "totalProfit",
    ])?;

    for row in rows {
        writer.write_record([
            row.currency.clone(),
            row.direction.map(|d| d.to_string()).unwrap_or_default(),
            row.total_trades.to_string(),
            row.matched_trades.to_string(),
            row.total_match_count.to_string(),
            row.success_rate.to_string(),
            row.total_volume.to_string(),
            row.total_profit.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write sweep summary rows to CSV, one per (window, adjustment) combination
pub fn write_sweep_rows_csv(rows: &[SweepRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "windowDays",
        "adjustment",
        "totalBuyVolume",
        "totalBuyProfit",
        "totalSellVolume",
        "totalSellProfit",
        "totalSuccessRate",
    ])?;

    for row in rows {
        writer.write_record([
            row.window_days.to_string(),
            row.adjustment.to_string(),
            row.total_buy_volume.to_string(),
            row.total_buy_profit.to_string(),
            row.total_sell_volume.to_string(),
            row.total_sell_profit.to_string(),
            row.total_success_rate.to_string(),
        ])?;
    }

    writer.flush()?;
    tracing::info!("Wrote {} sweep rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write the per-currency breakdown of every sweep cell to CSV
pub fn write_sweep_breakdown_csv(cells: &[SweepCell], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "windowDays",
        "adjustment",
        "currency",
        "direction",
        "totalTrades",
        "matchedTrades",
        "successRate",
        "totalVolume",
        "profit",
    ])?;

    for cell in cells {
        for row in &cell.breakdown {
            writer.write_record([
                cell.row.window_days.to_string(),
                cell.row.adjustment.to_string(),
                row.currency.clone(),
                row.direction.map(|d| d.to_string()).unwrap_or_default(),
                row.total_trades.to_string(),
                row.matched_trades.to_string(),
                row.success_rate.to_string(),
                row.total_volume.to_string(),
                row.total_profit.to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write the analysis report as pretty JSON
pub fn write_report_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
