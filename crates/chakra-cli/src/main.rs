use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

/// Runs one strategy over one basket of cached equity series and writes a
/// report directory (spec §6).
#[derive(Parser)]
#[command(name = "chakra", about = "Indian-equity strategy backtesting CLI", long_about = None)]
struct Cli {
    /// Plain-text file, one symbol per line, `#` comments allowed.
    #[arg(long)]
    basket_file: PathBuf,

    /// Registry key of the strategy to run, e.g. `ema_crossover`.
    #[arg(long)]
    strategy: String,

    /// Resampling target: `5m`, `15m`, `1h`, `1d`, `1w`, `1M`.
    #[arg(long, default_value = "1d")]
    interval: String,

    /// Longest look-back window to report: `1Y`, `3Y`, `5Y`, or `MAX`.
    #[arg(long, default_value = "MAX")]
    period: String,

    /// JSON object of strategy parameter overrides, e.g. `{"fast":10,"slow":20}`.
    #[arg(long)]
    params: Option<String>,

    /// Number of symbols backtested concurrently.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Symbol (e.g. `NIFTYBEES`) to load from `DATA_CACHE_DIR` and use as
    /// the external benchmark for alpha/beta (spec §4.7). Omit to skip
    /// alpha/beta reporting entirely.
    #[arg(long)]
    benchmark: Option<String>,

    /// Accepted for parity with the fetch-capable deployments of this tool;
    /// this build only ever reads from `DATA_CACHE_DIR`, so it's a no-op.
    #[arg(long)]
    use_cache_only: bool,

    /// Skip the upfront per-symbol validation gate.
    #[arg(long)]
    no_validate: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match std::panic::catch_unwind(AssertUnwindSafe(|| run(&cli))) {
        Ok(code) => code,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("internal exception: {msg}");
            3
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    if cli.use_cache_only {
        info!("--use_cache_only passed; this build always reads from DATA_CACHE_DIR, nothing to skip");
    }

    match try_run(cli) {
        Ok(run_dir) => {
            println!("report_dir={}", run_dir.display());
            0
        }
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<chakra_orchestrator::OrchestratorError>() {
                Some(chakra_orchestrator::OrchestratorError::Config(_)) => 1,
                Some(chakra_orchestrator::OrchestratorError::AllSymbolsFailed(_)) => 2,
                Some(chakra_orchestrator::OrchestratorError::Portfolio(_)) | None => 3,
            }
        }
    }
}

fn try_run(cli: &Cli) -> Result<PathBuf> {
    let interval = chakra_timeframe::parse_interval(&cli.interval)
        .map_err(|e| chakra_orchestrator::OrchestratorError::Config(e.to_string()))
        .context("parsing --interval")?;
    let period = parse_period(&cli.period)?;
    let params = parse_params(cli.params.as_deref())?;

    let cache_dir = chakra_orchestrator::env_path("DATA_CACHE_DIR", "data/cache");
    let report_dir = chakra_orchestrator::env_path("REPORT_DIR", "reports");

    let benchmark_equity = match &cli.benchmark {
        Some(symbol) => {
            let series = chakra_orchestrator::load_series(&cache_dir, symbol)
                .with_context(|| format!("loading --benchmark series '{symbol}'"))?;
            Some(chakra_orchestrator::benchmark_equity_curve(&series))
        }
        None => None,
    };

    let request = chakra_orchestrator::RunRequest {
        basket_file: cli.basket_file.clone(),
        strategy_key: cli.strategy.clone(),
        params,
        interval,
        period,
        worker_count: cli.workers,
        no_validate: cli.no_validate,
        cache_dir,
        report_dir,
        broker_config: chakra_schemas::BrokerConfig::conservative_defaults(),
        capital_mode: chakra_portfolio::CapitalMode::Isolated,
        shared_capital: None,
        benchmark_equity,
    };

    let outcome = chakra_orchestrator::run(&request).context("running backtest")?;
    if outcome.summary.failure_count > 0 {
        info!(
            failed = outcome.summary.failure_count,
            succeeded = outcome.summary.success_count,
            "run completed with some symbols failed"
        );
    }
    Ok(outcome.run_dir)
}

fn parse_period(raw: &str) -> Result<chakra_schemas::WindowLabel> {
    use chakra_schemas::WindowLabel;
    match raw {
        "1Y" => Ok(WindowLabel::OneYear),
        "3Y" => Ok(WindowLabel::ThreeYear),
        "5Y" => Ok(WindowLabel::FiveYear),
        "MAX" => Ok(WindowLabel::Max),
        other => Err(chakra_orchestrator::OrchestratorError::Config(format!(
            "invalid --period '{other}', expected one of 1Y, 3Y, 5Y, MAX"
        ))
        .into()),
    }
}

/// Parses `--params` as a JSON object overlay and logs its canonical hash
/// for run-to-run determinism comparisons (spec §9). An absent flag yields
/// `Value::Null`, which every strategy's parameter struct treats as "use
/// defaults" (`chakra_strategy::strategies::util::parse_params`).
fn parse_params(raw: Option<&str>) -> Result<serde_json::Value> {
    let Some(raw) = raw else {
        return Ok(serde_json::Value::Null);
    };
    let base = chakra_config::load_layered_yaml_from_strings(&[])
        .map_err(|e| chakra_orchestrator::OrchestratorError::Config(e.to_string()))?;
    let loaded = chakra_config::apply_params_override(&base, raw)
        .map_err(|e| chakra_orchestrator::OrchestratorError::Config(e.to_string()))?;
    info!(config_hash = %loaded.config_hash, "--params overlay applied");
    Ok(loaded.config_json)
}
