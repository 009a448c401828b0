//! The orchestration loop (spec §4.8): load each symbol's series, fan out
//! bounded-concurrency engine runs, aggregate the portfolio, and compute
//! window-sliced metrics for every symbol plus the portfolio total.

use std::path::Path;
use std::sync::Mutex;

use chakra_backtest::{BacktestConfig, BacktestEngine};
use chakra_integrity::validate;
use chakra_metrics::{attach_snapshots, compute_window_metrics, WindowMetrics};
use chakra_portfolio::{aggregate_portfolio, CapitalMode, PortfolioReport, SymbolRun};
use chakra_schemas::{window_slices, EquityPoint, Series};
use chakra_strategy::StrategyRegistry;
use chakra_timeframe::Interval;
use tracing::{info, warn};

use crate::data::load_series;
use crate::error::OrchestratorError;

/// One symbol's outcome: either it ran (possibly with warnings) or it
/// failed and is excluded from the portfolio.
pub enum SymbolOutcome {
    Ran { symbol: String, run: SymbolRun, data_fingerprint: String, warnings: Vec<String>, series: Series },
    Failed { symbol: String, reason: String },
}

pub struct RunConfig<'a> {
    pub cache_dir: &'a Path,
    pub strategy_key: &'a str,
    pub params: &'a serde_json::Value,
    pub interval: Interval,
    pub worker_count: usize,
    pub no_validate: bool,
    pub broker_config: BacktestConfig,
    pub capital_mode: CapitalMode,
    pub shared_capital: Option<f64>,
}

/// Runs every symbol in `basket` and returns one outcome per symbol, in
/// input order. Bounded to `worker_count` concurrent engines via
/// `std::thread::scope` — every engine run is pure CPU with no suspension
/// points, so a scoped thread pool is enough; no async runtime involved.
pub fn run_basket(
    basket: &[String],
    registry: &StrategyRegistry,
    config: &RunConfig<'_>,
) -> Result<Vec<SymbolOutcome>, OrchestratorError> {
    if !registry.contains(config.strategy_key) {
        return Err(OrchestratorError::Config(format!("unknown strategy key '{}'", config.strategy_key)));
    }

    let worker_count = config.worker_count.max(1).min(basket.len().max(1));
    let next = std::sync::atomic::AtomicUsize::new(0);
    let results: Mutex<Vec<Option<SymbolOutcome>>> = Mutex::new((0..basket.len()).map(|_| None).collect());

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let next = &next;
            let results = &results;
            scope.spawn(move || loop {
                let idx = next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if idx >= basket.len() {
                    break;
                }
                let outcome = run_one_symbol(&basket[idx], registry, config);
                results.lock().unwrap()[idx] = Some(outcome);
            });
        }
    });

    Ok(results.into_inner().unwrap().into_iter().map(|o| o.expect("every index populated")).collect())
}

fn run_one_symbol(symbol: &str, registry: &StrategyRegistry, config: &RunConfig<'_>) -> SymbolOutcome {
    let series = match load_series(config.cache_dir, symbol) {
        Ok(s) => s,
        Err(e) => {
            warn!("{symbol}: failed to load series: {e}");
            return SymbolOutcome::Failed { symbol: symbol.to_string(), reason: e.to_string() };
        }
    };

    let resampled = match chakra_timeframe::aggregate(&series, config.interval) {
        Ok(s) => s,
        Err(e) => {
            warn!("{symbol}: resampling failed: {e}");
            return SymbolOutcome::Failed { symbol: symbol.to_string(), reason: e.to_string() };
        }
    };

    if !config.no_validate {
        let upfront = validate(&resampled, symbol, None);
        if !upfront.errors.is_empty() {
            warn!("{symbol}: failed upfront validation: {:?}", upfront.errors);
            return SymbolOutcome::Failed { symbol: symbol.to_string(), reason: upfront.errors.join("; ") };
        }
    }

    let strategy = match registry.build(config.strategy_key, config.params) {
        Ok(s) => s,
        Err(e) => return SymbolOutcome::Failed { symbol: symbol.to_string(), reason: e.to_string() },
    };

    let mut engine = BacktestEngine::new(config.broker_config.clone(), strategy);
    match engine.run(&resampled) {
        Ok(report) => {
            info!("{symbol}: backtest complete, {} trades", report.trades.len());
            SymbolOutcome::Ran {
                symbol: symbol.to_string(),
                run: SymbolRun { symbol: symbol.to_string(), trades: report.trades, equity: report.equity },
                data_fingerprint: report.data_fingerprint.to_string(),
                warnings: report.warnings,
                series: resampled,
            }
        }
        Err(e) => {
            warn!("{symbol}: engine failed: {e}");
            SymbolOutcome::Failed { symbol: symbol.to_string(), reason: e.to_string() }
        }
    }
}

/// Per-symbol + portfolio window metrics for every label in
/// `chakra_schemas::WindowLabel::ALL`.
pub struct WindowedMetricsBundle {
    pub per_symbol: Vec<(String, Vec<WindowMetrics>)>,
    pub portfolio: Vec<WindowMetrics>,
}

/// Attaches indicator snapshots to each symbol's consolidated trades, then
/// computes window-sliced metrics per symbol (against that symbol's own
/// equity curve) and for the portfolio total (against the aggregated
/// curve).
pub fn compute_all_window_metrics(
    report: &PortfolioReport,
    ran: &[(String, Series, Vec<EquityPoint>)],
    benchmark: Option<&[EquityPoint]>,
) -> WindowedMetricsBundle {
    let mut per_symbol = Vec::new();
    for (symbol, series, equity) in ran {
        let Some(trades) = report.trades.get(symbol) else { continue };
        let mut trades = trades.clone();
        attach_snapshots(&mut trades, series);

        let min_low = series.lows().into_iter().fold(f64::INFINITY, f64::min);
        let max_high = series.highs().into_iter().fold(f64::NEG_INFINITY, f64::max);
        chakra_portfolio::validate_trade_prices(&mut trades, min_low, max_high);

        let Some(data_start) = series.first_ts() else { continue };
        let Some(data_end) = series.last_ts() else { continue };

        let windows = window_slices(data_start, data_end);
        let metrics: Vec<WindowMetrics> = windows
            .iter()
            .filter_map(|w| compute_window_metrics(w, &trades, equity, benchmark).ok())
            .collect();
        per_symbol.push((symbol.clone(), metrics));
    }

    let portfolio_trades: Vec<_> = report.trades.values().flatten().cloned().collect();
    let (Some(data_start), Some(data_end)) =
        (report.equity.first().map(|p| p.timestamp), report.equity.last().map(|p| p.timestamp))
    else {
        return WindowedMetricsBundle { per_symbol, portfolio: Vec::new() };
    };
    let windows = window_slices(data_start, data_end);
    let portfolio = windows
        .iter()
        .filter_map(|w| compute_window_metrics(w, &portfolio_trades, &report.equity, benchmark).ok())
        .collect();

    WindowedMetricsBundle { per_symbol, portfolio }
}

pub fn aggregate(
    runs: &[SymbolRun],
    capital_mode: CapitalMode,
    shared_capital: Option<f64>,
) -> Result<PortfolioReport, OrchestratorError> {
    aggregate_portfolio(runs, capital_mode, shared_capital).map_err(|e| OrchestratorError::Portfolio(e.to_string()))
}
