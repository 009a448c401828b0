use chakra_schemas::{Bar, Series};
use chrono::{Duration, TimeZone, Utc};

/// `n` daily bars starting at a fixed anchor date, one bar per calendar day.
pub fn daily_bars(n: usize, mut price_at: impl FnMut(usize) -> f64) -> Series {
    let anchor = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = price_at(i);
            let open = close * 0.999;
            let high = close * 1.004;
            let low = close * 0.996;
            Bar::new(anchor + Duration::days(i as i64), open, high, low, close, 10_000.0)
        })
        .collect();
    Series::new("TESTSYM", bars)
}

/// Steady uptrend: `base + i * step`.
pub fn trending_series(n: usize, base: f64, step: f64) -> Series {
    daily_bars(n, move |i| base + step * i as f64)
}

/// Flat-then-down-then-flat series, useful for exercising a stop-hit path.
pub fn flat_then_drop(n: usize, flat_price: f64, drop_at: usize, drop_price: f64) -> Series {
    daily_bars(n, move |i| if i < drop_at { flat_price } else { drop_price })
}
