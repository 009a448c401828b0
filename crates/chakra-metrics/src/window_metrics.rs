//! Assembles one window's worth of portfolio metrics (spec §4.7) from a
//! `ConsolidatedTrade` book and an equity curve already sliced to the
//! window's date range.

use chakra_schemas::{ConsolidatedTrade, EquityPoint, WindowLabel, WindowSlice};
use serde::Serialize;
use tracing::warn;

use crate::error::MetricsError;
use crate::irr::{irr, Cashflow};
use crate::ratios::{cagr, calmar_ratio, daily_returns, max_drawdown, profit_factor, sharpe_ratio, sortino_ratio, win_rate};
use crate::regression::alpha_beta;

/// One window's portfolio-level metrics (spec §6 "portfolio key metrics" row,
/// widened with the extra fields spec §4.7 names for `summary.json`).
#[derive(Clone, Debug, Serialize)]
pub struct WindowMetrics {
    pub window: WindowLabel,
    pub trades: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: Option<f64>,
    pub total_pnl_abs: f64,
    pub total_pnl_pct: Option<f64>,
    pub avg_trade_pnl_pct: Option<f64>,
    pub avg_holding_bars: Option<f64>,
    pub profit_factor: Option<f64>,
    pub max_drawdown_abs: f64,
    pub max_drawdown_pct: f64,
    pub cagr: Option<f64>,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub calmar: Option<f64>,
    pub irr: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
}

fn trade_falls_in_window(trade: &ConsolidatedTrade, window: &WindowSlice) -> bool {
    let anchor = trade.exit_time.unwrap_or(trade.entry_time);
    window.contains(anchor)
}

/// Build one window's metrics. `equity` must already be restricted to the
/// run's full curve (this function does the window filtering itself).
/// `benchmark_equity`, if given, is aligned to `equity`'s dates by
/// position after both are filtered to the window — callers are expected
/// to have already date-aligned the two curves upstream (spec §4.7:
/// "regression over daily returns").
pub fn compute_window_metrics(
    window: &WindowSlice,
    trades: &[ConsolidatedTrade],
    equity: &[EquityPoint],
    benchmark_equity: Option<&[EquityPoint]>,
) -> Result<WindowMetrics, MetricsError> {
    let windowed_equity: Vec<&EquityPoint> = equity.iter().filter(|p| window.contains(p.timestamp)).collect();
    if windowed_equity.is_empty() {
        return Err(MetricsError::EmptyWindow);
    }

    let windowed_trades: Vec<&ConsolidatedTrade> = trades.iter().filter(|t| trade_falls_in_window(t, window)).collect();
    let closed: Vec<&&ConsolidatedTrade> = windowed_trades.iter().filter(|t| t.exit_time.is_some()).collect();

    let pnls: Vec<f64> = closed.iter().filter_map(|t| t.net_pnl_abs).collect();
    let total_pnl_abs: f64 = pnls.iter().sum();

    let window_start_equity = windowed_equity.first().unwrap().total_equity;
    let total_pnl_pct = if window_start_equity > 0.0 { Some(total_pnl_abs / window_start_equity) } else { None };

    let trade_pcts: Vec<f64> = closed.iter().filter_map(|t| t.net_pnl_pct).collect();
    let avg_trade_pnl_pct = mean(&trade_pcts);

    let holding_bars: Vec<f64> = closed.iter().map(|t| t.holding_bars as f64).collect();
    let avg_holding_bars = mean(&holding_bars);

    let equity_totals: Vec<f64> = windowed_equity.iter().map(|p| p.total_equity).collect();
    let (max_drawdown_abs, max_drawdown_pct) = max_drawdown(&equity_totals);

    let start_ts = windowed_equity.first().unwrap().timestamp;
    let end_ts = windowed_equity.last().unwrap().timestamp;
    let span_days = (end_ts - start_ts).num_seconds() as f64 / 86_400.0;
    let end_equity = windowed_equity.last().unwrap().total_equity;
    let cagr_value = cagr(window_start_equity, end_equity, span_days);

    let returns = daily_returns(&equity_totals);
    let sharpe = sharpe_ratio(&returns);
    let sortino = sortino_ratio(&returns);
    let calmar = cagr_value.and_then(|c| calmar_ratio(c, max_drawdown_pct));

    let irr_value = compute_irr(&windowed_trades, start_ts);

    let (alpha, beta) = match benchmark_equity {
        Some(bench) => {
            let bench_totals: Vec<f64> = bench
                .iter()
                .filter(|p| window.contains(p.timestamp))
                .map(|p| p.total_equity)
                .collect();
            let bench_returns = daily_returns(&bench_totals);
            match alpha_beta(&returns, &bench_returns) {
                Some((a, b)) => (Some(a), Some(b)),
                None => (None, None),
            }
        }
        None => {
            warn!("no benchmark series supplied; alpha/beta omitted for window {}", window.label);
            (None, None)
        }
    };

    Ok(WindowMetrics {
        window: window.label,
        trades: closed.len() as u64,
        wins: pnls.iter().filter(|p| **p > 0.0).count() as u64,
        losses: pnls.iter().filter(|p| **p < 0.0).count() as u64,
        win_rate: win_rate(&pnls),
        total_pnl_abs,
        total_pnl_pct,
        avg_trade_pnl_pct,
        avg_holding_bars,
        profit_factor: profit_factor(&pnls),
        max_drawdown_abs,
        max_drawdown_pct,
        cagr: cagr_value,
        sharpe,
        sortino,
        calmar,
        irr: irr_value,
        alpha,
        beta,
    })
}

fn compute_irr(trades: &[&ConsolidatedTrade], window_start: chrono::DateTime<chrono::Utc>) -> Option<f64> {
    let mut flows = Vec::new();
    for trade in trades {
        let entry_days = (trade.entry_time - window_start).num_seconds() as f64 / 86_400.0;
        flows.push(Cashflow { days_from_start: entry_days.max(0.0), amount: -(trade.entry_price * trade.qty) });
        if let (Some(exit_time), Some(exit_price)) = (trade.exit_time, trade.exit_price) {
            let exit_days = (exit_time - window_start).num_seconds() as f64 / 86_400.0;
            flows.push(Cashflow { days_from_start: exit_days.max(0.0), amount: exit_price * trade.qty });
        }
    }
    irr(&flows)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chakra_schemas::{IndicatorSnapshot, WindowLabel};
    use chrono::{Duration, TimeZone, Utc};

    fn ts(day: i64) -> chrono::DateTime<chrono::Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn closed_trade(entry_day: i64, exit_day: i64, entry_price: f64, exit_price: f64, qty: f64) -> ConsolidatedTrade {
        let pnl = (exit_price - entry_price) * qty;
        ConsolidatedTrade {
            symbol: "TEST".to_string(),
            entry_time: ts(entry_day),
            exit_time: Some(ts(exit_day)),
            entry_price,
            exit_price: Some(exit_price),
            qty,
            net_pnl_abs: Some(pnl),
            net_pnl_pct: Some(pnl / (entry_price * qty)),
            holding_bars: (exit_day - entry_day) as u64,
            holding_days: (exit_day - entry_day) as f64,
            max_favorable_excursion: pnl.max(0.0),
            max_adverse_excursion: pnl.min(0.0),
            snapshot: IndicatorSnapshot::default(),
            close_reason: Some("signal".to_string()),
            price_violation: None,
        }
    }

    fn flat_equity(days: i64, start: f64, step: f64) -> Vec<EquityPoint> {
        (0..=days).map(|d| EquityPoint::new(ts(d), 0.0, start + step * d as f64)).collect()
    }

    #[test]
    fn a_winning_trade_produces_positive_total_pnl_and_win_rate_one() {
        let trades = vec![closed_trade(0, 10, 100.0, 120.0, 10.0)];
        let equity = flat_equity(10, 100_000.0, 100.0);
        let window = WindowSlice { label: WindowLabel::Max, start_ts: ts(0), end_ts: ts(10) };

        let metrics = compute_window_metrics(&window, &trades, &equity, None).unwrap();
        assert_eq!(metrics.trades, 1);
        assert_eq!(metrics.wins, 1);
        assert_eq!(metrics.losses, 0);
        assert_eq!(metrics.win_rate, Some(1.0));
        assert!((metrics.total_pnl_abs - 200.0).abs() < 1e-9);
    }

    #[test]
    fn empty_window_is_rejected() {
        let window = WindowSlice { label: WindowLabel::OneYear, start_ts: ts(100), end_ts: ts(110) };
        let err = compute_window_metrics(&window, &[], &[], None).unwrap_err();
        assert_eq!(err, MetricsError::EmptyWindow);
    }

    #[test]
    fn missing_benchmark_yields_none_alpha_beta() {
        let trades = vec![closed_trade(0, 5, 100.0, 105.0, 5.0)];
        let equity = flat_equity(5, 100_000.0, 50.0);
        let window = WindowSlice { label: WindowLabel::Max, start_ts: ts(0), end_ts: ts(5) };
        let metrics = compute_window_metrics(&window, &trades, &equity, None).unwrap();
        assert!(metrics.alpha.is_none());
        assert!(metrics.beta.is_none());
    }
}
