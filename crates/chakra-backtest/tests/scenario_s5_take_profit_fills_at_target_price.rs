use chakra_backtest::BacktestEngine;
use chakra_schemas::{Bar, BrokerConfig, Series, TradeEventKind};
use chakra_strategy::{BarContext, BarDirective, EntryDirective, IndicatorBinder, Strategy, StrategyError, StrategyState};
use chrono::{Duration, TimeZone, Utc};

/// Enters long on the very first bar it sees flat and sets a fixed
/// take-profit two points above the fill price on entry — isolating the
/// engine's intra-bar take-profit-check path the same way
/// `EntryThenHoldStrategy` isolates the stop-check path.
struct EntryThenHoldStrategy {
    entered: bool,
}

impl Strategy for EntryThenHoldStrategy {
    fn initialize(&mut self, _series: &Series, _binder: &mut IndicatorBinder) -> Result<(), StrategyError> {
        Ok(())
    }

    fn on_entry(&mut self, ctx: &BarContext) -> EntryDirective {
        EntryDirective {
            stop: None,
            take_profit: Some(ctx.bar.open + 2.0),
            tag: None,
        }
    }

    fn on_bar(&mut self, _ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let mut directive = BarDirective::default();
        if !self.entered && state.qty == 0.0 {
            self.entered = true;
            directive.enter_long = true;
            directive.reason = Some("always_enter_once".to_string());
        }
        directive
    }
}

fn bar(day: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
    let anchor = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    Bar::new(anchor + Duration::days(day), open, high, low, close, 10_000.0)
}

#[test]
fn take_profit_fills_at_the_target_price_when_touched_not_gapped() {
    // bar0 decides to enter; bar1's open fills it and sets the target at
    // open(100) + 2 = 102; bar2's high pokes up to 103 without gapping
    // through, so the target fills at exactly 102, not at bar2's open.
    let bars = vec![
        bar(0, 100.0, 100.5, 99.5, 100.0),
        bar(1, 100.0, 100.6, 99.8, 100.2),
        bar(2, 101.0, 103.0, 100.5, 102.5),
        bar(3, 102.5, 103.0, 102.0, 102.8),
    ];
    let series = Series::new("TPTEST", bars);

    let strategy = Box::new(EntryThenHoldStrategy { entered: false });
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).expect("run should not error");

    let entry = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::EntryLong)
        .expect("expected an entry fill");
    assert_eq!(entry.price, 100.0);

    let tp_hit = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::TpHit)
        .expect("expected a take-profit exit");
    assert_eq!(tp_hit.price, 102.0, "touched target should fill at the target price exactly");
}

#[test]
fn take_profit_fills_at_open_when_the_bar_gaps_through_it() {
    let bars = vec![
        bar(0, 100.0, 100.5, 99.5, 100.0),
        bar(1, 100.0, 100.6, 99.8, 100.2),
        // bar2 opens already above the target (102): a gap-up.
        bar(2, 105.0, 106.0, 104.5, 105.5),
    ];
    let series = Series::new("TPGAPTEST", bars);

    let strategy = Box::new(EntryThenHoldStrategy { entered: false });
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).expect("run should not error");

    let tp_hit = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::TpHit)
        .expect("expected a take-profit exit");
    assert_eq!(tp_hit.price, 105.0, "gapped-through target should fill at the bar's open");
}
