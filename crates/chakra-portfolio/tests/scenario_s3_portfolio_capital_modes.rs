//! Exercises both `CapitalMode` branches of `aggregate_portfolio` (spec
//! §4.6, scenario S3): isolated capital sums two symbols' curves
//! independently; shared capital pools one cash balance and drops an
//! entry it can't afford.

use chakra_portfolio::{aggregate_portfolio, CapitalMode, SymbolRun};
use chakra_schemas::{EquityPoint, TradeEvent, TradeEventKind};
use chrono::{TimeZone, Utc};

fn ts(day: i64) -> chrono::DateTime<chrono::Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day)
}

fn entry(symbol: &str, id: u64, day: i64, price: f64, qty: f64, cash_delta: f64) -> TradeEvent {
    TradeEvent {
        symbol: symbol.to_string(),
        trade_id: id,
        kind: TradeEventKind::EntryLong,
        timestamp: ts(day),
        price,
        qty,
        cash_delta,
        realized_pnl: None,
        reason: "signal".to_string(),
    }
}

fn exit(symbol: &str, id: u64, day: i64, price: f64, qty: f64, cash_delta: f64, pnl: f64) -> TradeEvent {
    TradeEvent {
        symbol: symbol.to_string(),
        trade_id: id,
        kind: TradeEventKind::ExitLong,
        timestamp: ts(day),
        price,
        qty,
        cash_delta,
        realized_pnl: Some(pnl),
        reason: "signal".to_string(),
    }
}

fn equity_point(day: i64, cash: f64, positions_value: f64) -> EquityPoint {
    EquityPoint::new(ts(day), cash, positions_value)
}

/// Symbol A: enters day 0 at 100 for 10 shares, exits day 5 at 110 (+100 pnl).
fn symbol_a() -> SymbolRun {
    let trades = vec![
        entry("A", 1, 0, 100.0, 10.0, -1000.0),
        exit("A", 2, 5, 110.0, 10.0, 1100.0, 100.0),
    ];
    let equity = (0..=5)
        .map(|d| {
            if d < 5 {
                equity_point(d, 99_000.0, 100_000.0 + 10.0 * d as f64 * 2.0)
            } else {
                equity_point(d, 100_100.0, 0.0)
            }
        })
        .collect();
    SymbolRun { symbol: "A".to_string(), trades, equity }
}

/// Symbol B: enters day 1 at 50 for 20 shares, exits day 4 at 40 (-200 pnl).
fn symbol_b() -> SymbolRun {
    let trades = vec![
        entry("B", 1, 1, 50.0, 20.0, -1000.0),
        exit("B", 2, 4, 40.0, 20.0, 800.0, -200.0),
    ];
    let equity = (0..=5)
        .map(|d| {
            if d < 1 {
                equity_point(d, 100_000.0, 0.0)
            } else if d < 4 {
                equity_point(d, 99_000.0, 1_000.0 - 20.0 * (d as f64 - 1.0))
            } else {
                equity_point(d, 99_800.0, 0.0)
            }
        })
        .collect();
    SymbolRun { symbol: "B".to_string(), trades, equity }
}

#[test]
fn isolated_mode_sums_independent_symbol_equity_curves() {
    let runs = vec![symbol_a(), symbol_b()];
    let report = aggregate_portfolio(&runs, CapitalMode::Isolated, None).expect("aggregation succeeds");

    assert!(report.dropped.is_empty());
    assert_eq!(report.trades.get("A").unwrap().len(), 1);
    assert_eq!(report.trades.get("B").unwrap().len(), 1);

    let last = report.equity.last().unwrap();
    assert!((last.cash - 199_900.0).abs() < 1e-6);

    let mut peak = f64::MIN;
    for point in &report.equity {
        peak = peak.max(point.total_equity);
        assert!(point.drawdown_abs <= 1e-9, "drawdown must never be positive");
        assert!((point.drawdown_abs - (point.total_equity - peak)).abs() < 1e-6);
    }
}

#[test]
fn shared_mode_pools_cash_and_drops_entries_it_cannot_afford() {
    let runs = vec![symbol_a(), symbol_b()];

    // Only enough pooled cash for one entry: symbol A's (1000.0), not both.
    let report = aggregate_portfolio(&runs, CapitalMode::Shared, Some(1_500.0)).expect("aggregation succeeds");

    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].symbol, "B");

    assert!(report.equity.iter().all(|p| p.cash >= -1e-6));
}

#[test]
fn shared_mode_without_initial_capital_is_rejected() {
    let runs = vec![symbol_a()];
    let err = aggregate_portfolio(&runs, CapitalMode::Shared, None).unwrap_err();
    assert_eq!(err, chakra_portfolio::PortfolioError::MissingSharedCapital);
}

#[test]
fn empty_input_is_rejected() {
    let err = aggregate_portfolio(&[], CapitalMode::Isolated, None).unwrap_err();
    assert_eq!(err, chakra_portfolio::PortfolioError::EmptyInput);
}
