use chakra_schemas::{Bar, Series};
use chakra_timeframe::{aggregate, Interval};
use chrono::{TimeZone, Utc};

/// 75 one-minute bars with a linearly increasing close, aggregated to 75m,
/// collapse into exactly one bar carrying bar1's open, bar75's close, the
/// run's high/low, and summed volume (spec §8 S5).
#[test]
fn seventy_five_minute_bars_collapse_to_one() {
    let bars: Vec<Bar> = (0..75)
        .map(|i| {
            let ts = Utc.timestamp_opt(i as i64 * 60, 0).unwrap();
            let close = 100.0 + i as f64 * 0.25;
            Bar::new(ts, close - 0.05, close + 0.1, close - 0.15, close, 500.0)
        })
        .collect();
    let series = Series::new("NIFTY", bars.clone());

    let out = aggregate(&series, Interval::Minutes(75)).unwrap();

    assert_eq!(out.len(), 1);
    let collapsed = out.bars[0];
    assert_eq!(collapsed.open, bars[0].open);
    assert_eq!(collapsed.close, bars[74].close);
    assert_eq!(collapsed.high, bars.iter().map(|b| b.high).fold(f64::MIN, f64::max));
    assert_eq!(collapsed.low, bars.iter().map(|b| b.low).fold(f64::MAX, f64::min));
    assert_eq!(collapsed.volume, 75.0 * 500.0);
}
