use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation at the series' native interval.
///
/// Invariant: `low <= open, close <= high` and `low > 0`. `Series::validate`
/// (in `chakra-integrity`) is the place that actually enforces this over a
/// whole run; `Bar::is_price_consistent` is the cheap per-bar check reused
/// there and by the engine's NaN/skip handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(ts: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when every field is finite (rejects NaN/Inf bars for the engine's
    /// "NaN bar encountered: skip, no fills, no signals" rule in spec §4.4.3).
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// `low <= open, close <= high` and `low > 0`.
    pub fn is_price_consistent(&self) -> bool {
        self.low > 0.0
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

/// An ordered sequence of bars for one symbol.
///
/// Invariant (enforced by `chakra-integrity::validate`, not here): strictly
/// monotonically increasing timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn first_ts(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.ts)
    }

    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.ts)
    }

    /// A sub-series containing only bars with `ts` in `[start, end]` inclusive.
    pub fn slice_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Series {
        let bars = self
            .bars
            .iter()
            .copied()
            .filter(|b| b.ts >= start && b.ts <= end)
            .collect();
        Series::new(self.symbol.clone(), bars)
    }
}
