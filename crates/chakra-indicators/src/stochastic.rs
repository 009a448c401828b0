use crate::{not_yet_valid, rsi::rsi, moving_average::sma};

#[derive(Clone, Debug, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Classic %K/%D stochastic oscillator. When the `k_period` high/low range
/// is exactly zero (a dead-flat market), %K is defined as neutral (50)
/// rather than dividing by zero.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_smooth: usize,
) -> StochasticOutput {
    let n = highs.len();
    if k_period == 0 || k_period > n || lows.len() != n || closes.len() != n {
        return StochasticOutput {
            k: not_yet_valid(n),
            d: not_yet_valid(n),
        };
    }

    let mut k = not_yet_valid(n);
    for i in (k_period - 1)..n {
        let start = i + 1 - k_period;
        let hh = highs[start..=i].iter().cloned().fold(f64::MIN, f64::max);
        let ll = lows[start..=i].iter().cloned().fold(f64::MAX, f64::min);
        let range = hh - ll;
        k[i] = Some(if range == 0.0 {
            50.0
        } else {
            (closes[i] - ll) / range * 100.0
        });
    }

    let k_values: Vec<f64> = k.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let d_raw = sma(&k_values, d_smooth);
    let d: Vec<Option<f64>> = d_raw
        .iter()
        .zip(k.iter())
        .map(|(d_val, k_val)| match (d_val, k_val) {
            (Some(d), Some(_)) if !d.is_nan() => Some(*d),
            _ => None,
        })
        .collect();

    StochasticOutput { k, d }
}

/// Stochastic RSI: the stochastic oscillator formula applied to an
/// already-computed RSI series instead of price. Returns `None` wherever
/// the underlying RSI hasn't stabilized yet.
pub fn stochastic_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    d_smooth: usize,
) -> StochasticOutput {
    let n = closes.len();
    let rsi_series = rsi(closes, rsi_period);

    let mut k = not_yet_valid(n);
    for i in 0..n {
        if i + 1 < stoch_period {
            continue;
        }
        let start = i + 1 - stoch_period;
        let window: Vec<f64> = rsi_series[start..=i].iter().filter_map(|v| *v).collect();
        if window.len() != stoch_period {
            continue;
        }
        let hh = window.iter().cloned().fold(f64::MIN, f64::max);
        let ll = window.iter().cloned().fold(f64::MAX, f64::min);
        let range = hh - ll;
        let current = match rsi_series[i] {
            Some(v) => v,
            None => continue,
        };
        k[i] = Some(if range == 0.0 {
            50.0
        } else {
            (current - ll) / range * 100.0
        });
    }

    let k_values: Vec<f64> = k.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let d_raw = sma(&k_values, d_smooth);
    let d: Vec<Option<f64>> = d_raw
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    StochasticOutput { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_range_is_neutral_fifty() {
        let highs = vec![10.0; 10];
        let lows = vec![10.0; 10];
        let closes = vec![10.0; 10];
        let out = stochastic(&highs, &lows, &closes, 5, 3);
        assert_eq!(out.k[4], Some(50.0));
    }

    #[test]
    fn close_at_high_is_one_hundred() {
        let highs = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let lows = vec![9.0, 9.0, 9.0, 9.0, 9.0];
        let closes = vec![9.0, 9.0, 9.0, 9.0, 14.0];
        let out = stochastic(&highs, &lows, &closes, 5, 3);
        assert_eq!(out.k[4], Some(100.0));
    }

    #[test]
    fn stoch_rsi_waits_for_rsi_history() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + (i as f64 * 0.3).sin()).collect();
        let out = stochastic_rsi(&closes, 14, 14, 3);
        assert!(out.k[..14].iter().all(|x| x.is_none()));
    }
}
