use crate::not_yet_valid;

/// Kaufman's Adaptive Moving Average. `period` sets the efficiency-ratio
/// look-back; `fast`/`slow` are the fast/slow EMA constants (2 and 30 in
/// the bundled strategies' defaults) that bound the adaptive smoothing
/// constant.
///
/// Efficiency ratio = |net change over `period`| / (sum of |bar-to-bar
/// change| over `period`). A flat-but-choppy series drives the ratio
/// toward 0 (slow smoothing); a strong trend drives it toward 1 (fast
/// smoothing). When the volatility sum is exactly zero the ratio is
/// defined as 0 (slowest smoothing) rather than dividing by zero.
pub fn kama(values: &[f64], period: usize, fast: usize, slow: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 || period >= n || fast == 0 || slow == 0 {
        return not_yet_valid(n);
    }
    let mut out = not_yet_valid(n);
    let fast_sc = 2.0 / (fast as f64 + 1.0);
    let slow_sc = 2.0 / (slow as f64 + 1.0);

    out[period] = Some(values[period]);
    let mut prev = values[period];

    for i in (period + 1)..n {
        let change = (values[i] - values[i - period]).abs();
        let volatility: f64 = (i - period + 1..=i)
            .map(|j| (values[j] - values[j - 1]).abs())
            .sum();
        let er = if volatility == 0.0 {
            0.0
        } else {
            change / volatility
        };
        let sc = (er * (fast_sc - slow_sc) + slow_sc).powi(2);
        let next = prev + sc * (values[i] - prev);
        out[i] = Some(next);
        prev = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_converges_to_the_flat_value() {
        let v = vec![5.0; 20];
        let out = kama(&v, 5, 2, 30);
        assert_eq!(out[19], Some(5.0));
    }

    #[test]
    fn strong_trend_tracks_closely() {
        let v: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let out = kama(&v, 5, 2, 30);
        let last = out[29].unwrap();
        assert!((last - 29.0).abs() < 2.0);
    }

    #[test]
    fn period_exceeding_series_len_is_all_none() {
        let v = vec![1.0, 2.0, 3.0];
        let out = kama(&v, 5, 2, 30);
        assert!(out.iter().all(|x| x.is_none()));
    }
}
