use chakra_backtest::BacktestEngine;
use chakra_schemas::{Bar, BrokerConfig, Series, TradeEventKind};
use chakra_strategy::{BarContext, BarDirective, EntryDirective, IndicatorBinder, Strategy, StrategyError, StrategyState};
use chrono::{Duration, TimeZone, Utc};

/// Enters long on the very first bar it sees flat, sets a fixed stop two
/// points below the fill price on entry, and otherwise never signals an
/// exit — isolating the engine's intra-bar stop-check path.
struct EntryThenHoldStrategy {
    entered: bool,
}

impl Strategy for EntryThenHoldStrategy {
    fn initialize(&mut self, _series: &Series, _binder: &mut IndicatorBinder) -> Result<(), StrategyError> {
        Ok(())
    }

    fn on_entry(&mut self, ctx: &BarContext) -> EntryDirective {
        EntryDirective {
            stop: Some(ctx.bar.open - 2.0),
            take_profit: None,
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
fn stop_hit_fills_at_the_stop_price_when_touched_not_gapped() {
    // bar0 decides to enter; bar1's open fills it and sets the stop at
    // open(100) - 2 = 98; bar2's low dips to 97 without gapping through,
    // so the stop fills at exactly 98, not at bar2's open.
    let bars = vec![
        bar(0, 100.0, 100.5, 99.5, 100.0),
        bar(1, 100.0, 100.6, 99.8, 100.2),
        bar(2, 99.0, 99.5, 97.0, 97.5),
        bar(3, 97.5, 98.0, 97.0, 97.8),
    ];
    let series = Series::new("STOPTEST", bars);

    let strategy = Box::new(EntryThenHoldStrategy { entered: false });
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).expect("run should not error");

    let entry = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::EntryLong)
        .expect("expected an entry fill");
    assert_eq!(entry.price, 100.0);

    let stop_hit = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::StopHit)
        .expect("expected a stop-hit exit");
    assert_eq!(stop_hit.price, 98.0, "touched stop should fill at the stop price exactly");
}

#[test]
fn stop_hit_fills_at_open_when_the_bar_gaps_through_it() {
    let bars = vec![
        bar(0, 100.0, 100.5, 99.5, 100.0),
        bar(1, 100.0, 100.6, 99.8, 100.2),
        // bar2 opens already below the stop (98): a gap-down.
        bar(2, 95.0, 95.5, 94.0, 94.5),
    ];
    let series = Series::new("GAPTEST", bars);

    let strategy = Box::new(EntryThenHoldStrategy { entered: false });
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);
    let report = engine.run(&series).expect("run should not error");

    let stop_hit = report
        .trades
        .iter()
        .find(|t| t.kind == TradeEventKind::StopHit)
        .expect("expected a stop-hit exit");
    assert_eq!(stop_hit.price, 95.0, "gapped-through stop should fill at the bar's open");
}
