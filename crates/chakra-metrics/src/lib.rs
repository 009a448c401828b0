//! chakra-metrics
//!
//! Turns a portfolio's raw equity curve and consolidated trade book into
//! the reported numbers (spec §4.7): risk/return ratios, IRR, alpha/beta
//! against a benchmark, per-trade indicator snapshots, and the CSV row
//! formats the orchestrator writes to disk.

mod csv;
mod error;
mod irr;
mod ratios;
mod regression;
mod snapshot;
mod window_metrics;

pub use csv::{
    consolidated_trade_rows, portfolio_key_metrics_row, round2, CONSOLIDATED_TRADES_HEADER, PORTFOLIO_KEY_METRICS_HEADER,
};
pub use error::MetricsError;
pub use irr::{irr, Cashflow};
pub use ratios::{cagr, calmar_ratio, daily_returns, max_drawdown, profit_factor, sharpe_ratio, sortino_ratio, win_rate};
pub use regression::alpha_beta;
pub use snapshot::{attach_snapshots, IndicatorSequences};
pub use window_metrics::{compute_window_metrics, WindowMetrics};
