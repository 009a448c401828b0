mod common;

use chakra_backtest::BacktestEngine;
use chakra_schemas::BrokerConfig;
use chakra_strategy::strategies::{IchimokuParams, IchimokuStrategy};

/// With default periods (conv=9, base=26, lead=52) the shifted cloud never
/// becomes valid before bar ~77. A series shorter than that must produce
/// zero trades no matter how the tenkan/kijun lines move.
#[test]
fn short_series_never_warms_up_the_cloud_and_trades_zero() {
    let series = common::trending_series(60, 100.0, 1.0);
    let strategy = Box::new(IchimokuStrategy::new(IchimokuParams::default()));
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);

    let report = engine.run(&series).expect("run should not error");

    assert!(
        report.trades.is_empty(),
        "cloud should still be warming up at bar 60, got trades: {:?}",
        report.trades
    );
}

#[test]
fn long_enough_trending_series_eventually_enters() {
    let series = common::trending_series(250, 100.0, 0.6);
    let strategy = Box::new(IchimokuStrategy::new(IchimokuParams::default()));
    let mut engine = BacktestEngine::new(BrokerConfig::test_defaults(), strategy);

    let report = engine.run(&series).expect("run should not error");
    assert!(
        !report.trades.is_empty(),
        "a long, clean uptrend should eventually trip the above-cloud tenkan/kijun cross"
    );
}
