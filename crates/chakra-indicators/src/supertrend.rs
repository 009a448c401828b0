use crate::atr::atr;
use crate::not_yet_valid;

#[derive(Clone, Debug, PartialEq)]
pub struct SupertrendOutput {
    pub value: Vec<Option<f64>>,
    /// `true` while price is above the trailing band (uptrend).
    pub is_uptrend: Vec<Option<bool>>,
}

/// Supertrend: an ATR-banded trend-following overlay. `multiplier` scales
/// the ATR band width (3.0 is the conventional default). The first valid
/// index is the first index where the underlying ATR is valid.
pub fn supertrend(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> SupertrendOutput {
    let n = highs.len();
    let atr_series = atr(highs, lows, closes, period);

    let mut value = not_yet_valid(n);
    let mut is_uptrend = vec![None; n];

    let mut final_upper: Option<f64> = None;
    let mut final_lower: Option<f64> = None;
    let mut trend_up = true;

    for i in 0..n {
        let atr_val = match atr_series[i] {
            Some(v) => v,
            None => continue,
        };
        let hl2 = (highs[i] + lows[i]) / 2.0;
        let basic_upper = hl2 + multiplier * atr_val;
        let basic_lower = hl2 - multiplier * atr_val;

        let upper = match final_upper {
            Some(prev_upper) if closes[i - 1] <= prev_upper => basic_upper.min(prev_upper),
            _ => basic_upper,
        };
        let lower = match final_lower {
            Some(prev_lower) if closes[i - 1] >= prev_lower => basic_lower.max(prev_lower),
            _ => basic_lower,
        };

        if final_upper.is_none() && final_lower.is_none() {
            trend_up = closes[i] >= lower;
        } else if trend_up && closes[i] < lower {
            trend_up = false;
        } else if !trend_up && closes[i] > upper {
            trend_up = true;
        }

        value[i] = Some(if trend_up { lower } else { upper });
        is_uptrend[i] = Some(trend_up);

        final_upper = Some(upper);
        final_lower = Some(lower);
    }

    SupertrendOutput { value, is_uptrend }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sustained_uptrend_stays_flagged_up() {
        let highs: Vec<f64> = (0..40).map(|i| 11.0 + i as f64).collect();
        let lows: Vec<f64> = (0..40).map(|i| 9.0 + i as f64).collect();
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
        let out = supertrend(&highs, &lows, &closes, 10, 3.0);
        assert_eq!(out.is_uptrend[39], Some(true));
    }

    #[test]
    fn too_short_series_is_all_none() {
        let highs = vec![10.0; 5];
        let lows = vec![9.0; 5];
        let closes = vec![9.5; 5];
        let out = supertrend(&highs, &lows, &closes, 10, 3.0);
        assert!(out.value.iter().all(|x| x.is_none()));
    }
}
