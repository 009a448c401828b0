//! Writes one run's artifacts to `<REPORT_DIR>/<MMDD-HHMM>-<strategy>-<basket>-<interval>/`
//! (spec §6). Hand-rolled `format!` + `fs::write`, same convention as the
//! teacher's run-artifact writer — no `csv::Writer`.

use std::fs;
use std::path::{Path, PathBuf};

use chakra_metrics::{consolidated_trade_rows, portfolio_key_metrics_row, CONSOLIDATED_TRADES_HEADER, PORTFOLIO_KEY_METRICS_HEADER};
use chakra_portfolio::PortfolioReport;
use chakra_schemas::{ConsolidatedTrade, EquityPoint, WindowLabel};
use chrono::{DateTime, Datelike, Utc};

use crate::error::OrchestratorError;
use crate::run::WindowedMetricsBundle;
use crate::summary::RunSummary;

const EQUITY_CURVE_HEADER: &str = "Date,Cash,Positions Value,Total Equity,Drawdown INR,Drawdown %";

fn equity_curve_row(point: &EquityPoint) -> String {
    format!(
        "{},{:.2},{:.2},{:.2},{:.2},{:.2}",
        point.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
        point.cash,
        point.positions_value,
        point.total_equity,
        point.drawdown_abs,
        point.drawdown_pct * 100.0,
    )
}

/// Rolls a daily curve up to monthly by keeping the last observation of
/// each calendar month (spec §6: "Monthly rolled up by last observation
/// of month").
fn monthly_rollup(daily: &[EquityPoint]) -> Vec<EquityPoint> {
    let mut months: Vec<(i32, u32)> = Vec::new();
    let mut last_of_month: std::collections::HashMap<(i32, u32), EquityPoint> = std::collections::HashMap::new();
    for point in daily {
        let key = (point.timestamp.year(), point.timestamp.month());
        if !last_of_month.contains_key(&key) {
            months.push(key);
        }
        last_of_month.insert(key, *point);
    }
    months.into_iter().map(|k| last_of_month[&k]).collect()
}

/// Builds the report directory name: `<MMDD-HHMM>-<strategy>-<basket>-<interval>`.
pub fn report_dir_name(now: DateTime<Utc>, strategy: &str, basket: &str, interval: &str) -> String {
    format!("{}-{strategy}-{basket}-{interval}", now.format("%m%d-%H%M"))
}

pub struct RunArtifacts<'a> {
    pub report_root: &'a Path,
    pub dir_name: &'a str,
    pub summary: &'a RunSummary,
    pub portfolio: &'a PortfolioReport,
    pub windowed: &'a WindowedMetricsBundle,
}

pub fn write_run_artifacts(artifacts: &RunArtifacts<'_>) -> Result<PathBuf, OrchestratorError> {
    let run_dir = artifacts.report_root.join(artifacts.dir_name);
    fs::create_dir_all(&run_dir)
        .map_err(|e| OrchestratorError::Config(format!("failed to create report dir '{}': {e}", run_dir.display())))?;

    write_json(&run_dir.join("summary.json"), artifacts.summary)?;

    for label in WindowLabel::ALL {
        write_consolidated_trades(&run_dir, label, artifacts.portfolio)?;
        write_equity_curves(&run_dir, label, artifacts.portfolio)?;
        write_portfolio_key_metrics(&run_dir, label, artifacts.windowed)?;
    }

    write_strategy_backtests_summary(&run_dir, artifacts.windowed)?;

    Ok(run_dir)
}

fn write_json(path: &Path, value: &RunSummary) -> Result<(), OrchestratorError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| OrchestratorError::Config(format!("failed to serialize summary: {e}")))?;
    fs::write(path, format!("{json}\n"))
        .map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", path.display())))
}

fn write_consolidated_trades(run_dir: &Path, label: WindowLabel, portfolio: &PortfolioReport) -> Result<(), OrchestratorError> {
    let now = Utc::now();
    let mut body = String::from(CONSOLIDATED_TRADES_HEADER);
    body.push('\n');

    let mut symbols: Vec<&String> = portfolio.trades.keys().collect();
    symbols.sort();

    let mut trade_number = 0u64;
    for symbol in symbols {
        let trades: Vec<&ConsolidatedTrade> = portfolio.trades[symbol]
            .iter()
            .filter(|t| window_contains(label, portfolio, t.exit_time.unwrap_or(t.entry_time)))
            .collect();
        for trade in trades {
            trade_number += 1;
            for row in consolidated_trade_rows(trade_number, trade, now) {
                body.push_str(&row);
                body.push('\n');
            }
        }
    }

    let path = run_dir.join(format!("consolidated_trades_{}.csv", label.as_str()));
    fs::write(&path, body).map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", path.display())))
}

fn window_contains(label: WindowLabel, portfolio: &PortfolioReport, ts: DateTime<Utc>) -> bool {
    let Some(data_start) = portfolio.equity.first().map(|p| p.timestamp) else { return false };
    let Some(data_end) = portfolio.equity.last().map(|p| p.timestamp) else { return false };
    chakra_schemas::window_slices(data_start, data_end)
        .into_iter()
        .find(|w| w.label == label)
        .is_some_and(|w| w.contains(ts))
}

fn write_equity_curves(run_dir: &Path, label: WindowLabel, portfolio: &PortfolioReport) -> Result<(), OrchestratorError> {
    let Some(data_start) = portfolio.equity.first().map(|p| p.timestamp) else {
        return Ok(());
    };
    let Some(data_end) = portfolio.equity.last().map(|p| p.timestamp) else {
        return Ok(());
    };
    let window = chakra_schemas::window_slices(data_start, data_end).into_iter().find(|w| w.label == label);
    let Some(window) = window else { return Ok(()) };

    let daily: Vec<EquityPoint> = portfolio.equity.iter().filter(|p| window.contains(p.timestamp)).copied().collect();

    let mut daily_body = String::from(EQUITY_CURVE_HEADER);
    daily_body.push('\n');
    for point in &daily {
        daily_body.push_str(&equity_curve_row(point));
        daily_body.push('\n');
    }
    let daily_path = run_dir.join(format!("portfolio_daily_equity_curve_{}.csv", label.as_str()));
    fs::write(&daily_path, daily_body)
        .map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", daily_path.display())))?;

    let monthly = monthly_rollup(&daily);
    let mut monthly_body = String::from(EQUITY_CURVE_HEADER);
    monthly_body.push('\n');
    for point in &monthly {
        monthly_body.push_str(&equity_curve_row(point));
        monthly_body.push('\n');
    }
    let monthly_path = run_dir.join(format!("portfolio_monthly_equity_curve_{}.csv", label.as_str()));
    fs::write(&monthly_path, monthly_body)
        .map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", monthly_path.display())))
}

fn write_portfolio_key_metrics(run_dir: &Path, label: WindowLabel, windowed: &WindowedMetricsBundle) -> Result<(), OrchestratorError> {
    let mut body = String::from(PORTFOLIO_KEY_METRICS_HEADER);
    body.push('\n');

    for (symbol, metrics) in &windowed.per_symbol {
        if let Some(m) = metrics.iter().find(|m| m.window == label) {
            body.push_str(&portfolio_key_metrics_row(symbol, m));
            body.push('\n');
        }
    }
    if let Some(m) = windowed.portfolio.iter().find(|m| m.window == label) {
        body.push_str(&portfolio_key_metrics_row("PORTFOLIO", m));
        body.push('\n');
    }

    let path = run_dir.join(format!("portfolio_key_metrics_{}.csv", label.as_str()));
    fs::write(&path, body).map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", path.display())))
}

/// One row per symbol, taken from the MAX window — the headline
/// per-strategy-run summary table.
fn write_strategy_backtests_summary(run_dir: &Path, windowed: &WindowedMetricsBundle) -> Result<(), OrchestratorError> {
    let mut body = String::from(PORTFOLIO_KEY_METRICS_HEADER);
    body.push('\n');
    for (symbol, metrics) in &windowed.per_symbol {
        if let Some(m) = metrics.iter().find(|m| m.window == WindowLabel::Max) {
            body.push_str(&portfolio_key_metrics_row(symbol, m));
            body.push('\n');
        }
    }
    let path = run_dir.join("strategy_backtests_summary.csv");
    fs::write(&path, body).map_err(|e| OrchestratorError::Config(format!("failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_dir_name_follows_the_mmdd_hhmm_convention() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
        let name = report_dir_name(now, "ema_crossover", "nifty50", "1d");
        assert_eq!(name, "0307-0930-ema_crossover-nifty50-1d");
    }
}
