//! Per-trade indicator snapshots (spec §4.7): a fixed set of indicator
//! readings captured at entry time, from sequences computed once over the
//! whole series — never a hand-typed string key into a map, which is the
//! exact bug class (a `stochrsi_bullish`/`stoch_rsi_bullish` typo silently
//! producing an empty column) this crate's typed `IndicatorSnapshot` is
//! built to make impossible.

use chakra_indicators::{aroon, atr, ichimoku, macd, rsi, stochastic, stochastic_rsi};
use chakra_schemas::{ConsolidatedTrade, Series, TrendClass, VolatilityClass, VolumeClass};

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const AROON_PERIOD: usize = 25;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const ICHIMOKU_CONV: usize = 9;
const ICHIMOKU_BASE: usize = 26;
const ICHIMOKU_LEAD: usize = 52;
const STOCH_K: usize = 14;
const STOCH_D: usize = 3;
const MIN_RANK_HISTORY: usize = 20;

/// Every sequence needed to build a snapshot at any bar index, computed
/// once per symbol.
pub struct IndicatorSequences {
    rsi: Vec<Option<f64>>,
    atr: Vec<Option<f64>>,
    aroon_up: Vec<Option<f64>>,
    aroon_down: Vec<Option<f64>>,
    macd_histogram: Vec<Option<f64>>,
    ichimoku_above_cloud: Vec<Option<bool>>,
    stoch_k: Vec<Option<f64>>,
    stoch_d: Vec<Option<f64>>,
    stoch_rsi_k: Vec<Option<f64>>,
    stoch_rsi_d: Vec<Option<f64>>,
    volumes: Vec<f64>,
}

impl IndicatorSequences {
    pub fn compute(series: &Series) -> Self {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let atr_seq = atr(&highs, &lows, &closes, ATR_PERIOD);
        let aroon_seq = aroon(&highs, &lows, AROON_PERIOD);
        let macd_seq = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let ichimoku_seq = ichimoku(&highs, &lows, &closes, ICHIMOKU_CONV, ICHIMOKU_BASE, ICHIMOKU_LEAD);
        let stoch_seq = stochastic(&highs, &lows, &closes, STOCH_K, STOCH_D);
        let stoch_rsi_seq = stochastic_rsi(&closes, RSI_PERIOD, STOCH_K, STOCH_D);

        let ichimoku_above_cloud = (0..series.len())
            .map(|i| match (ichimoku_seq.senkou_a[i], ichimoku_seq.senkou_b[i]) {
                (Some(a), Some(b)) => Some(closes[i] > a.max(b)),
                _ => None,
            })
            .collect();

        Self {
            rsi: rsi(&closes, RSI_PERIOD),
            atr: atr_seq,
            aroon_up: aroon_seq.up,
            aroon_down: aroon_seq.down,
            macd_histogram: macd_seq.histogram,
            ichimoku_above_cloud,
            stoch_k: stoch_seq.k,
            stoch_d: stoch_seq.d,
            stoch_rsi_k: stoch_rsi_seq.k,
            stoch_rsi_d: stoch_rsi_seq.d,
            volumes,
        }
    }

    pub fn snapshot_at(&self, i: usize) -> chakra_schemas::IndicatorSnapshot {
        chakra_schemas::IndicatorSnapshot {
            rsi: self.rsi.get(i).copied().flatten(),
            rsi_bullish: self.rsi.get(i).copied().flatten().map(|v| v > 50.0),
            atr: self.atr.get(i).copied().flatten(),
            volatility_class: pct_rank_class(&self.atr, i),
            trend_class: self.trend_class_at(i),
            macd_bullish: self.macd_histogram.get(i).copied().flatten().map(|v| v > 0.0),
            ichimoku_above_cloud: self.ichimoku_above_cloud.get(i).copied().flatten(),
            stoch_bullish: bullish_crossover(&self.stoch_k, &self.stoch_d, i),
            stoch_rsi_bullish: bullish_crossover(&self.stoch_rsi_k, &self.stoch_rsi_d, i),
            volume_class: volume_rank_class(&self.volumes, i),
        }
    }

    fn trend_class_at(&self, i: usize) -> Option<TrendClass> {
        let up = *self.aroon_up.get(i)?;
        let down = *self.aroon_down.get(i)?;
        let (up, down) = (up?, down?);
        Some(if up > down + 20.0 {
            TrendClass::Up
        } else if down > up + 20.0 {
            TrendClass::Down
        } else {
            TrendClass::Sideways
        })
    }
}

fn bullish_crossover(k: &[Option<f64>], d: &[Option<f64>], i: usize) -> Option<bool> {
    match (k.get(i).copied().flatten(), d.get(i).copied().flatten()) {
        (Some(k), Some(d)) => Some(k > d),
        _ => None,
    }
}

/// Percentile rank of `series[i]` within `series[..=i]` (expanding window —
/// no look-ahead), bucketed into terciles. `None` before `MIN_RANK_HISTORY`
/// valid observations have accumulated.
fn pct_rank_class(series: &[Option<f64>], i: usize) -> Option<VolatilityClass> {
    let value = series.get(i).copied().flatten()?;
    let history: Vec<f64> = series[..=i].iter().filter_map(|v| *v).collect();
    if history.len() < MIN_RANK_HISTORY {
        return None;
    }
    let rank = pct_rank(&history, value);
    Some(if rank < 1.0 / 3.0 {
        VolatilityClass::Low
    } else if rank < 2.0 / 3.0 {
        VolatilityClass::Medium
    } else {
        VolatilityClass::High
    })
}

fn volume_rank_class(volumes: &[f64], i: usize) -> Option<VolumeClass> {
    if i + 1 < MIN_RANK_HISTORY {
        return None;
    }
    let history = &volumes[..=i];
    let rank = pct_rank(history, volumes[i]);
    Some(if rank < 1.0 / 3.0 {
        VolumeClass::Low
    } else if rank < 2.0 / 3.0 {
        VolumeClass::Medium
    } else {
        VolumeClass::High
    })
}

fn pct_rank(history: &[f64], value: f64) -> f64 {
    let below = history.iter().filter(|v| **v <= value).count();
    below as f64 / history.len() as f64
}

/// Stamp `snapshot` onto every `trade` in `trades` whose `entry_time`
/// matches a bar in `series` (exact timestamp match — entries always fire
/// at a bar's open, so every entry time is a bar timestamp).
pub fn attach_snapshots(trades: &mut [ConsolidatedTrade], series: &Series) {
    let sequences = IndicatorSequences::compute(series);
    let index_of: std::collections::HashMap<chrono::DateTime<chrono::Utc>, usize> =
        series.bars.iter().enumerate().map(|(i, b)| (b.ts, i)).collect();

    for trade in trades.iter_mut() {
        if let Some(&i) = index_of.get(&trade.entry_time) {
            trade.snapshot = sequences.snapshot_at(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chakra_schemas::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn series(n: usize) -> Series {
        let anchor = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.3 + (i as f64 / 5.0).sin() * 2.0;
                Bar::new(anchor + Duration::days(i as i64), close - 0.2, close + 1.0, close - 1.0, close, 10_000.0 + i as f64 * 5.0)
            })
            .collect();
        Series::new("TEST", bars)
    }

    #[test]
    fn snapshot_is_none_fields_before_enough_history() {
        let s = series(5);
        let seq = IndicatorSequences::compute(&s);
        let snap = seq.snapshot_at(2);
        assert!(snap.rsi.is_none());
        assert!(snap.volatility_class.is_none());
    }

    #[test]
    fn snapshot_has_populated_fields_once_warmed_up() {
        let s = series(200);
        let seq = IndicatorSequences::compute(&s);
        let snap = seq.snapshot_at(150);
        assert!(snap.rsi.is_some());
        assert!(snap.atr.is_some());
        assert!(snap.volatility_class.is_some());
        assert!(snap.volume_class.is_some());
    }

    #[test]
    fn attach_snapshots_matches_entry_time_to_bar_index() {
        let s = series(200);
        let mut trades = vec![ConsolidatedTrade {
            symbol: "TEST".to_string(),
            entry_time: s.bars[150].ts,
            exit_time: Some(s.bars[160].ts),
            entry_price: s.bars[150].close,
            exit_price: Some(s.bars[160].close),
            qty: 10.0,
            net_pnl_abs: Some(50.0),
            net_pnl_pct: Some(0.01),
            holding_bars: 10,
            holding_days: 10.0,
            max_favorable_excursion: 60.0,
            max_adverse_excursion: -5.0,
            snapshot: chakra_schemas::IndicatorSnapshot::default(),
            close_reason: Some("signal".to_string()),
            price_violation: None,
        }];
        attach_snapshots(&mut trades, &s);
        assert!(trades[0].snapshot.rsi.is_some());
    }
}
