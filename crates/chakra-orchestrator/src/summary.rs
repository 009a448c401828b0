//! The `summary.json` run-summary document (spec §6).

use std::collections::BTreeMap;

use chakra_metrics::WindowMetrics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct WindowSummaryBlock {
    pub window: String,
    pub trades: u64,
    pub win_rate: Option<f64>,
    pub total_pnl_pct: Option<f64>,
    pub cagr: Option<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown_pct: f64,
}

impl From<&WindowMetrics> for WindowSummaryBlock {
    fn from(m: &WindowMetrics) -> Self {
        Self {
            window: m.window.as_str().to_string(),
            trades: m.trades,
            win_rate: m.win_rate,
            total_pnl_pct: m.total_pnl_pct,
            cagr: m.cagr,
            sharpe: m.sharpe,
            max_drawdown_pct: m.max_drawdown_pct,
        }
    }
}

#[derive(Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub strategy_name: String,
    pub basket_name: String,
    pub interval: String,
    pub windows: Vec<WindowSummaryBlock>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub symbol_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub data_fingerprints: BTreeMap<String, String>,
    pub validation_issues: Option<Vec<String>>,
    pub failures: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_an_object_with_expected_keys() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            strategy_name: "ema_crossover".to_string(),
            basket_name: "nifty50".to_string(),
            interval: "1d".to_string(),
            windows: Vec::new(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            symbol_count: 2,
            success_count: 1,
            failure_count: 1,
            data_fingerprints: BTreeMap::new(),
            validation_issues: None,
            failures: BTreeMap::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["strategy_name"], "ema_crossover");
        assert_eq!(json["success_count"], 1);
    }
}
