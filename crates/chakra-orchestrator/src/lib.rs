//! chakra-orchestrator
//!
//! Composes every other crate into one run (spec §4.8): load each basket
//! symbol's cached series, fan out bounded-concurrency engines, aggregate
//! the portfolio, compute window-sliced metrics, and write the report
//! directory. `chakra-cli` is a thin `clap` wrapper around [`run`].

mod artifacts;
mod basket;
mod data;
mod error;
mod run;
mod summary;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chakra_backtest::BacktestConfig;
use chakra_portfolio::CapitalMode;
use chakra_schemas::{EquityPoint, WindowLabel};
use chakra_strategy::StrategyRegistry;
use chakra_timeframe::Interval;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub use artifacts::report_dir_name;
pub use basket::{basket_name, load_basket};
pub use data::{benchmark_equity_curve, load_series};
pub use error::OrchestratorError;
pub use run::{run_basket, RunConfig, SymbolOutcome};
pub use summary::RunSummary;

/// Everything the CLI gathers from flags/env vars before invoking a run.
pub struct RunRequest {
    pub basket_file: PathBuf,
    pub strategy_key: String,
    pub params: serde_json::Value,
    pub interval: Interval,
    pub period: WindowLabel,
    pub worker_count: usize,
    pub no_validate: bool,
    pub cache_dir: PathBuf,
    pub report_dir: PathBuf,
    pub broker_config: BacktestConfig,
    pub capital_mode: CapitalMode,
    pub shared_capital: Option<f64>,
    pub benchmark_equity: Option<Vec<EquityPoint>>,
}

/// Windows at or below `period` in the `{1Y < 3Y < 5Y < MAX}` ordering
/// (spec §6: `--period` "affects windows reported").
fn reportable_windows(period: WindowLabel) -> Vec<WindowLabel> {
    WindowLabel::ALL.into_iter().filter(|w| *w <= period).collect()
}

pub struct RunOutcome {
    pub run_dir: PathBuf,
    pub summary: RunSummary,
}

/// Runs the whole pipeline for one basket/strategy and writes the report
/// directory. Returns `Err` for config problems and all-symbols-failed;
/// anything else (a panic inside this function) is the CLI's exit-code-3
/// case, caught at the `main` boundary, not here.
pub fn run(request: &RunRequest) -> Result<RunOutcome, OrchestratorError> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();

    let symbols = load_basket(&request.basket_file)?;
    let basket = basket_name(&request.basket_file);
    info!(run_id = %run_id, strategy = %request.strategy_key, symbols = symbols.len(), "starting run");

    let registry = chakra_strategy::default_registry();
    if !registry.contains(&request.strategy_key) {
        return Err(OrchestratorError::Config(format!("unknown strategy key '{}'", request.strategy_key)));
    }

    let run_config = RunConfig {
        cache_dir: &request.cache_dir,
        strategy_key: &request.strategy_key,
        params: &request.params,
        interval: request.interval,
        worker_count: request.worker_count,
        no_validate: request.no_validate,
        broker_config: request.broker_config.clone(),
        capital_mode: request.capital_mode,
        shared_capital: request.shared_capital,
    };

    let outcomes = run_basket(&symbols, &registry, &run_config)?;

    let mut ran = Vec::new();
    let mut failures: BTreeMap<String, String> = BTreeMap::new();
    let mut data_fingerprints: BTreeMap<String, String> = BTreeMap::new();
    let mut validation_issues = Vec::new();

    for outcome in outcomes {
        match outcome {
            SymbolOutcome::Ran { symbol, run, data_fingerprint, warnings, series } => {
                data_fingerprints.insert(symbol.clone(), data_fingerprint);
                validation_issues.extend(warnings.iter().map(|w| format!("{symbol}: {w}")));
                ran.push((symbol, run, series));
            }
            SymbolOutcome::Failed { symbol, reason } => {
                error!(%symbol, %reason, "symbol failed");
                failures.insert(symbol, reason);
            }
        }
    }

    if ran.is_empty() {
        return Err(OrchestratorError::AllSymbolsFailed(failures.into_iter().collect()));
    }

    let symbol_runs: Vec<_> = ran.iter().map(|(_, run, _)| run.clone()).collect();
    let portfolio = run::aggregate(&symbol_runs, request.capital_mode, request.shared_capital)?;

    let for_metrics: Vec<(String, chakra_schemas::Series, Vec<EquityPoint>)> =
        ran.into_iter().map(|(symbol, run, series)| (symbol, series, run.equity)).collect();
    let windowed = run::compute_all_window_metrics(&portfolio, &for_metrics, request.benchmark_equity.as_deref());

    let windows = reportable_windows(request.period);
    let mut filtered = windowed;
    filtered.portfolio.retain(|m| windows.contains(&m.window));
    for (_, metrics) in filtered.per_symbol.iter_mut() {
        metrics.retain(|m| windows.contains(&m.window));
    }

    let interval_label = request.interval.to_string();
    let dir_name = report_dir_name(started_at, &request.strategy_key, &basket, &interval_label);

    let ended_at = Utc::now();
    let summary = RunSummary {
        run_id,
        strategy_name: request.strategy_key.clone(),
        basket_name: basket,
        interval: interval_label,
        windows: filtered.portfolio.iter().map(Into::into).collect(),
        started_at,
        ended_at,
        symbol_count: data_fingerprints.len() + failures.len(),
        success_count: data_fingerprints.len(),
        failure_count: failures.len(),
        data_fingerprints,
        validation_issues: if validation_issues.is_empty() { None } else { Some(validation_issues) },
        failures,
    };

    if !summary.failures.is_empty() {
        warn!(failed = summary.failures.len(), "run completed with failed symbols");
    }

    let run_dir = artifacts::write_run_artifacts(&artifacts::RunArtifacts {
        report_root: &request.report_dir,
        dir_name: &dir_name,
        summary: &summary,
        portfolio: &portfolio,
        windowed: &filtered,
    })?;

    Ok(RunOutcome { run_dir, summary })
}

/// `DATA_CACHE_DIR` / `REPORT_DIR` defaults (spec §6), resolved from the
/// environment with a fallback.
pub fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| Path::new(default).to_path_buf())
}

pub fn default_registry() -> StrategyRegistry {
    chakra_strategy::default_registry()
}
