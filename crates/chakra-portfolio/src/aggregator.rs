//! Ties ordering, the shared-capital ledger, and consolidation together
//! into one entry point (spec §4.6).

use std::collections::{BTreeMap, HashMap};

use chakra_schemas::{ConsolidatedTrade, EquityPoint};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::consolidate::consolidate;
use crate::ledger::{DroppedEntry, Ledger};
use crate::ordering::merge_canonical;
use crate::types::{CapitalMode, PortfolioError, SymbolRun};

/// The assembled output of `aggregate_portfolio`.
#[derive(Clone, Debug)]
pub struct PortfolioReport {
    pub mode: CapitalMode,
    pub equity: Vec<EquityPoint>,
    pub trades: HashMap<String, Vec<ConsolidatedTrade>>,
    /// Only ever non-empty under `CapitalMode::Shared`.
    pub dropped: Vec<DroppedEntry>,
}

/// Build one portfolio-level equity curve and trade book out of several
/// per-symbol runs.
///
/// `Isolated` sums each symbol's own `total_equity` across the union of
/// trading dates, forward-filling a symbol's last known value on dates it
/// didn't trade (spec §4.6 step 1). `Shared` replays the canonically
/// ordered trade stream through one pooled-cash `Ledger` and marks
/// unrealized value using each symbol's own `positions_value` curve — an
/// approximation documented in the project's design notes, since the
/// aggregator's input contract carries no raw per-symbol price series to
/// revalue a pooled position against.
pub fn aggregate_portfolio(
    runs: &[SymbolRun],
    mode: CapitalMode,
    initial_capital_for_shared: Option<f64>,
) -> Result<PortfolioReport, PortfolioError> {
    if runs.is_empty() {
        return Err(PortfolioError::EmptyInput);
    }

    let trades = runs
        .iter()
        .map(|r| (r.symbol.clone(), consolidate(&r.symbol, &r.trades, &r.equity)))
        .collect::<HashMap<_, _>>();

    let (equity, dropped) = match mode {
        CapitalMode::Isolated => (isolated_equity_curve(runs), Vec::new()),
        CapitalMode::Shared => {
            let capital = initial_capital_for_shared.ok_or(PortfolioError::MissingSharedCapital)?;
            shared_replay(runs, capital)
        }
    };

    Ok(PortfolioReport { mode, equity, trades, dropped })
}

fn isolated_equity_curve(runs: &[SymbolRun]) -> Vec<EquityPoint> {
    let mut dates: Vec<DateTime<Utc>> = runs
        .iter()
        .flat_map(|r| r.equity.iter().map(|p| p.timestamp))
        .collect();
    dates.sort();
    dates.dedup();

    let mut last_known: Vec<Option<&EquityPoint>> = vec![None; runs.len()];
    let mut cursor: Vec<usize> = vec![0; runs.len()];

    let mut points: Vec<EquityPoint> = dates
        .into_iter()
        .map(|ts| {
            let mut cash = 0.0;
            let mut positions_value = 0.0;
            for (i, run) in runs.iter().enumerate() {
                while cursor[i] < run.equity.len() && run.equity[cursor[i]].timestamp <= ts {
                    last_known[i] = Some(&run.equity[cursor[i]]);
                    cursor[i] += 1;
                }
                if let Some(point) = last_known[i] {
                    cash += point.cash;
                    positions_value += point.positions_value;
                }
            }
            EquityPoint::new(ts, cash, positions_value)
        })
        .collect::<Vec<_>>();
    track_drawdown(&mut points);
    points
}

/// Stamp running-peak drawdown onto an already-chronological equity curve.
fn track_drawdown(points: &mut [EquityPoint]) {
    let mut peak = f64::MIN;
    for point in points {
        peak = peak.max(point.total_equity);
        point.drawdown_abs = point.total_equity - peak;
        point.drawdown_pct = if peak > 0.0 { point.drawdown_abs / peak } else { 0.0 };
    }
}

fn shared_replay(runs: &[SymbolRun], initial_capital: f64) -> (Vec<EquityPoint>, Vec<DroppedEntry>) {
    let refs: Vec<(&str, &[chakra_schemas::TradeEvent])> =
        runs.iter().map(|r| (r.symbol.as_str(), r.trades.as_slice())).collect();
    let merged = merge_canonical(&refs);

    let marks = marks_by_symbol(runs);

    let mut ledger = Ledger::new(initial_capital);
    let mut curve = Vec::with_capacity(merged.len());
    for event in &merged {
        ledger.apply(event);
        let positions_value: f64 = runs
            .iter()
            .map(|r| mark_at(&marks, &r.symbol, event.trade.timestamp))
            .sum();
        curve.push(EquityPoint::new(event.trade.timestamp, ledger.cash(), positions_value));
    }
    track_drawdown(&mut curve);

    if !ledger.dropped().is_empty() {
        warn!(count = ledger.dropped().len(), "shared capital pool rejected entries");
    }
    (curve, ledger.dropped().to_vec())
}

fn marks_by_symbol(runs: &[SymbolRun]) -> HashMap<String, BTreeMap<DateTime<Utc>, f64>> {
    runs.iter()
        .map(|r| {
            let map = r.equity.iter().map(|p| (p.timestamp, p.positions_value)).collect();
            (r.symbol.clone(), map)
        })
        .collect()
}

/// Last known `positions_value` for `symbol` at or before `ts` (forward-fill).
fn mark_at(marks: &HashMap<String, BTreeMap<DateTime<Utc>, f64>>, symbol: &str, ts: DateTime<Utc>) -> f64 {
    marks
        .get(symbol)
        .and_then(|m| m.range(..=ts).next_back())
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

