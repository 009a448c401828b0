use chakra_schemas::{Bar, Series};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::error::AggregationError;
use crate::interval::Interval;

/// A monotonically non-decreasing bucket identity; two bars land in the
/// same output bar iff `bucket_key` agrees for both.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    /// Epoch-anchored integer bucket index for the fixed-duration variants.
    /// Flooring a multiple of a finer bucket width by a coarser one that
    /// evenly divides it reproduces the coarser index exactly, which is
    /// what makes aggregation associative (spec invariant, §8 S5).
    Fixed(i64),
    Daily(i32, u32, u32),
    Weekly(i32, u32),
    Monthly(i32, u32),
}

fn bucket_start(ts: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    match interval {
        Interval::Minutes(_) | Interval::Hours(_) => {
            let width = interval.intraday_minutes().unwrap() as i64;
            let epoch_minutes = ts.timestamp().div_euclid(60);
            let bucket_index = epoch_minutes.div_euclid(width);
            Utc.timestamp_opt(bucket_index * width * 60, 0).unwrap()
        }
        Interval::Daily => Utc
            .with_ymd_and_hms(ts.year(), ts.month(), ts.day(), 0, 0, 0)
            .unwrap(),
        Interval::Weekly => {
            let monday = ts.date_naive() - Duration::days(ts.weekday().num_days_from_monday() as i64);
            Utc.with_ymd_and_hms(monday.year(), monday.month(), monday.day(), 0, 0, 0)
                .unwrap()
        }
        Interval::Monthly => Utc.with_ymd_and_hms(ts.year(), ts.month(), 1, 0, 0, 0).unwrap(),
    }
}

fn bucket_key(ts: DateTime<Utc>, interval: Interval) -> BucketKey {
    match interval {
        Interval::Minutes(_) | Interval::Hours(_) => {
            let width = interval.intraday_minutes().unwrap() as i64;
            BucketKey::Fixed(ts.timestamp().div_euclid(60).div_euclid(width))
        }
        Interval::Daily => BucketKey::Daily(ts.year(), ts.month(), ts.day()),
        Interval::Weekly => {
            let monday = ts.date_naive() - Duration::days(ts.weekday().num_days_from_monday() as i64);
            BucketKey::Weekly(monday.year(), monday.iso_week().week())
        }
        Interval::Monthly => BucketKey::Monthly(ts.year(), ts.month()),
    }
}

struct Accumulator {
    ts: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Accumulator {
    fn start(bar: &Bar, interval: Interval) -> Self {
        Self {
            ts: bucket_start(bar.ts, interval),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn absorb(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    fn finish(self) -> Bar {
        Bar::new(self.ts, self.open, self.high, self.low, self.close, self.volume)
    }
}

/// Resample `series` into `target`-interval bars (spec §4.5). Groups
/// contiguous input bars: open = first, high = max, low = min, close =
/// last, volume = sum. Buckets with no input bars simply never appear —
/// there is no synthetic fill for gaps. Requires `series` to already be
/// sorted ascending by timestamp (the same invariant `chakra-integrity`
/// checks upstream); an out-of-order input is rejected rather than
/// silently mis-bucketed.
pub fn aggregate(series: &Series, target: Interval) -> Result<Series, AggregationError> {
    if series.is_empty() {
        return Ok(Series::new(series.symbol.clone(), Vec::new()));
    }

    let mut out = Vec::new();
    let mut current: Option<(BucketKey, Accumulator)> = None;
    let mut last_ts = None;

    for bar in &series.bars {
        if let Some(prev) = last_ts {
            if bar.ts < prev {
                return Err(AggregationError::UnsortedInput(bar.ts));
            }
        }
        last_ts = Some(bar.ts);

        let key = bucket_key(bar.ts, target);
        match &mut current {
            Some((cur_key, acc)) if *cur_key == key => acc.absorb(bar),
            Some((_, _)) => {
                let (_, finished) = current.take().unwrap();
                out.push(finished.finish());
                current = Some((key, Accumulator::start(bar, target)));
            }
            None => current = Some((key, Accumulator::start(bar, target))),
        }
    }
    if let Some((_, acc)) = current {
        out.push(acc.finish());
    }

    Ok(Series::new(series.symbol.clone(), out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minute_bars(n: usize, anchor_minute: i64) -> Series {
        let bars = (0..n)
            .map(|i| {
                let ts = Utc.timestamp_opt((anchor_minute + i as i64) * 60, 0).unwrap();
                let close = 100.0 + i as f64;
                Bar::new(ts, close - 0.1, close + 0.2, close - 0.3, close, 1.0)
            })
            .collect();
        Series::new("AGGTEST", bars)
    }

    #[test]
    fn seventy_five_one_minute_bars_become_one_seventy_five_minute_bar() {
        // Anchor at an exact 75-minute grid boundary so the whole run lands
        // in a single output bucket (spec §8 S5).
        let series = minute_bars(75, 0);
        let out = aggregate(&series, Interval::Minutes(75)).unwrap();

        assert_eq!(out.len(), 1);
        let bar = out.bars[0];
        assert_eq!(bar.open, series.bars[0].open);
        assert_eq!(bar.close, series.bars[74].close);
        assert_eq!(bar.high, series.bars.iter().map(|b| b.high).fold(f64::MIN, f64::max));
        assert_eq!(bar.low, series.bars.iter().map(|b| b.low).fold(f64::MAX, f64::min));
        assert_eq!(bar.volume, 75.0);
    }

    #[test]
    fn aggregation_is_associative_1m_5m_75m_matches_1m_75m() {
        let series = minute_bars(375, 0);
        let direct = aggregate(&series, Interval::Minutes(75)).unwrap();
        let via_5m = aggregate(&series, Interval::Minutes(5)).unwrap();
        let staged = aggregate(&via_5m, Interval::Minutes(75)).unwrap();

        assert_eq!(direct.bars.len(), staged.bars.len());
        for (a, b) in direct.bars.iter().zip(staged.bars.iter()) {
            assert_eq!(a.ts, b.ts);
            assert!((a.open - b.open).abs() < 1e-9);
            assert!((a.high - b.high).abs() < 1e-9);
            assert!((a.low - b.low).abs() < 1e-9);
            assert!((a.close - b.close).abs() < 1e-9);
            assert!((a.volume - b.volume).abs() < 1e-9);
        }
    }

    #[test]
    fn partial_trailing_group_is_kept_not_padded() {
        // 80 bars at 75m grouping: one full bucket of 75, one partial of 5 —
        // no synthetic fill for the missing 70 bars in the second bucket.
        let series = minute_bars(80, 0);
        let out = aggregate(&series, Interval::Minutes(75)).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.bars[1].volume, 5.0);
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let mut series = minute_bars(10, 0);
        series.bars.swap(0, 1);
        assert!(aggregate(&series, Interval::Minutes(5)).is_err());
    }

    #[test]
    fn daily_aggregation_groups_by_calendar_day() {
        let bars = vec![
            Bar::new(Utc.with_ymd_and_hms(2023, 1, 2, 9, 15, 0).unwrap(), 100.0, 101.0, 99.0, 100.5, 10.0),
            Bar::new(Utc.with_ymd_and_hms(2023, 1, 2, 15, 0, 0).unwrap(), 100.5, 102.0, 100.0, 101.5, 20.0),
            Bar::new(Utc.with_ymd_and_hms(2023, 1, 3, 9, 15, 0).unwrap(), 101.5, 103.0, 101.0, 102.5, 15.0),
        ];
        let series = Series::new("DAYTEST", bars);
        let out = aggregate(&series, Interval::Daily).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.bars[0].open, 100.0);
        assert_eq!(out.bars[0].close, 101.5);
        assert_eq!(out.bars[0].volume, 30.0);
        assert_eq!(out.bars[1].close, 102.5);
    }
}
