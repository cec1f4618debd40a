use crate::aggregate::{
    aggregate_by_currency, aggregate_by_currency_and_direction, success_rate, AggregateRow,
};
use crate::models::MatchResult;
use serde::{Deserialize, Serialize};

/// Overall and per-currency view of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_trades: usize,
    pub matched_trades: usize,
    pub success_rate: f64,
    pub by_currency: Vec<AggregateRow>,
    pub by_currency_and_direction: Vec<AggregateRow>,
}

impl AnalysisReport {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let total_trades = results.len();
        let matched_trades = results.iter().filter(|r| r.found).count();

        Self {
            total_trades,
            matched_trades,
            success_rate: success_rate(matched_trades, total_trades),
            by_currency: aggregate_by_currency(results),
            by_currency_and_direction: aggregate_by_currency_and_direction(results),
        }
    }

    /// Print a formatted report to stdout
    pub fn print_report(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║             TARGET PRICE ANALYSIS REPORT              ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");

        println!("📊 OVERALL");
        println!("  Total Trades:          {}", self.total_trades);
        println!("  Target Reached:        {}", self.matched_trades);
        println!("  Success Rate:          {:.2}%", self.success_rate);

        if !self.by_currency.is_empty() {
            println!("\n💱 BY CURRENCY");
            println!(
                "  {:<8} {:>8} {:>8} {:>8} {:>10}",
                "", "trades", "reached", "hits", "rate"
            );
            for row in &self.by_currency {
                println!(
                    "  {:<8} {:>8} {:>8} {:>8} {:>9.2}%",
                    row.currency,
                    row.total_trades,
                    row.matched_trades,
                    row.total_match_count,
                    row.success_rate
                );
            }

            println!("\n↕️  BY CURRENCY AND SIDE");
            println!(
                "  {:<8} {:<5} {:>8} {:>8} {:>10} {:>12}",
                "", "", "trades", "reached", "rate", "volume"
            );
            for row in &self.by_currency_and_direction {
                let side = row.direction.map(|d| d.to_string()).unwrap_or_default();
                println!(
                    "  {:<8} {:<5} {:>8} {:>8} {:>9.2}% {:>12.2}",
                    row.currency,
                    side,
                    row.total_trades,
                    row.matched_trades,
                    row.success_rate,
                    row.total_volume
                );
            }
        }

        println!("\n═══════════════════════════════════════════════════════\n");
    }
}
