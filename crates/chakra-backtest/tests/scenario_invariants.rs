mod common;

use chakra_backtest::BacktestEngine;
use chakra_schemas::{BrokerConfig, TradeEventKind};
use chakra_strategy::strategies::{EmaCrossoverParams, EmaCrossoverStrategy};

fn up_then_down_series() -> chakra_schemas::Series {
    common::daily_bars(400, |i| {
        if i < 200 {
            100.0 + 0.5 * i as f64
        } else {
            200.0 - 0.6 * (i - 200) as f64
        }
    })
}

#[test]
fn cash_never_goes_negative() {
    let series = up_then_down_series();
    let strategy = Box::new(EmaCrossoverStrategy::new(EmaCrossoverParams::default()));
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).unwrap();

    for point in &report.equity {
        assert!(point.cash >= -1e-6, "cash went negative: {}", point.cash);
    }
}

#[test]
fn exit_events_always_follow_their_entry_in_time() {
    let series = up_then_down_series();
    let strategy = Box::new(EmaCrossoverStrategy::new(EmaCrossoverParams::default()));
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).unwrap();

    let mut last_entry_ts = None;
    for trade in &report.trades {
        match trade.kind {
            TradeEventKind::EntryLong => last_entry_ts = Some(trade.timestamp),
            TradeEventKind::ExitLong | TradeEventKind::StopHit | TradeEventKind::TpHit => {
                if let Some(entry_ts) = last_entry_ts {
                    assert!(
                        trade.timestamp > entry_ts,
                        "exit at {} did not come strictly after its entry at {}",
                        trade.timestamp,
                        entry_ts
                    );
                }
            }
        }
    }
}

#[test]
fn drawdown_is_never_positive_and_peak_only_grows() {
    let series = up_then_down_series();
    let strategy = Box::new(EmaCrossoverStrategy::new(EmaCrossoverParams::default()));
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).unwrap();

    let mut peak = f64::MIN;
    for point in &report.equity {
        assert!(point.drawdown_abs <= 1e-6, "drawdown_abs should never be positive");
        assert!(point.drawdown_pct <= 1e-9, "drawdown_pct should never be positive");
        peak = peak.max(point.total_equity);
        assert!(point.total_equity <= peak + 1e-6);
    }
}

/// With zero commission and the position fully closed by the end of the
/// run, cash can only have moved by the sum of realized P&L.
#[test]
fn realized_pnl_reconciles_with_cash_when_flat_at_the_end() {
    let series = up_then_down_series();
    let strategy = Box::new(EmaCrossoverStrategy::new(EmaCrossoverParams::default()));
    let config = BrokerConfig::test_defaults();
    let initial_capital = config.initial_capital;
    let mut engine = BacktestEngine::new(config, strategy);
    let report = engine.run(&series).unwrap();

    let entries: f64 = report
        .trades
        .iter()
        .filter(|t| t.kind == TradeEventKind::EntryLong)
        .count() as f64;
    let exits: f64 = report
        .trades
        .iter()
        .filter(|t| t.kind != TradeEventKind::EntryLong)
        .count() as f64;

    if entries == exits {
        let final_cash = report.equity.last().unwrap().cash;
        let realized_sum: f64 = report.trades.iter().filter_map(|t| t.realized_pnl).sum();
        assert!(
            (final_cash - (initial_capital + realized_sum)).abs() < 1e-6,
            "final cash {final_cash} should equal initial {initial_capital} + realized {realized_sum}"
        );
    }
}
