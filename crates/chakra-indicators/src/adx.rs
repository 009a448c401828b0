use crate::not_yet_valid;

#[derive(Clone, Debug, PartialEq)]
pub struct AdxOutput {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

/// Wilder's ADX / +DI / -DI. All three series share the same `period` for
/// the directional-movement and true-range smoothing steps, and ADX itself
/// is smoothed over the same period again, matching the classic two-stage
/// Wilder formulation.
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> AdxOutput {
    let n = highs.len();
    if period == 0 || period * 2 >= n || lows.len() != n || closes.len() != n {
        return AdxOutput {
            adx: not_yet_valid(n),
            plus_di: not_yet_valid(n),
            minus_di: not_yet_valid(n),
        };
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = vec![0.0; n];
    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        let a = highs[i] - lows[i];
        let b = (highs[i] - closes[i - 1]).abs();
        let c = (lows[i] - closes[i - 1]).abs();
        tr[i] = a.max(b).max(c);
    }

    let wilder_smooth = |raw: &[f64]| -> Vec<Option<f64>> {
        let mut smoothed = not_yet_valid(n);
        let sum: f64 = raw[1..=period].iter().sum();
        smoothed[period] = Some(sum);
        let mut prev = sum;
        for i in (period + 1)..n {
            let next = prev - prev / period as f64 + raw[i];
            smoothed[i] = Some(next);
            prev = next;
        }
        smoothed
    };

    let smoothed_tr = wilder_smooth(&tr);
    let smoothed_plus_dm = wilder_smooth(&plus_dm);
    let smoothed_minus_dm = wilder_smooth(&minus_dm);

    let mut plus_di = not_yet_valid(n);
    let mut minus_di = not_yet_valid(n);
    let mut dx = not_yet_valid(n);

    for i in period..n {
        if let (Some(tr_s), Some(pdm), Some(mdm)) =
            (smoothed_tr[i], smoothed_plus_dm[i], smoothed_minus_dm[i])
        {
            if tr_s == 0.0 {
                plus_di[i] = Some(0.0);
                minus_di[i] = Some(0.0);
                dx[i] = Some(0.0);
                continue;
            }
            let pdi = pdm / tr_s * 100.0;
            let mdi = mdm / tr_s * 100.0;
            plus_di[i] = Some(pdi);
            minus_di[i] = Some(mdi);
            let di_sum = pdi + mdi;
            dx[i] = Some(if di_sum == 0.0 {
                0.0
            } else {
                (pdi - mdi).abs() / di_sum * 100.0
            });
        }
    }

    let dx_start = period;
    let mut adx_out = not_yet_valid(n);
    let adx_first_idx = dx_start + period - 1;
    if adx_first_idx < n {
        let seed: f64 = dx[dx_start..adx_first_idx + 1]
            .iter()
            .map(|v| v.unwrap_or(0.0))
            .sum::<f64>()
            / period as f64;
        adx_out[adx_first_idx] = Some(seed);
        let mut prev = seed;
        for i in (adx_first_idx + 1)..n {
            let d = dx[i].unwrap_or(0.0);
            let next = (prev * (period as f64 - 1.0) + d) / period as f64;
            adx_out[i] = Some(next);
            prev = next;
        }
    }

    AdxOutput {
        adx: adx_out,
        plus_di,
        minus_di,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_uptrend_has_dominant_plus_di() {
        let highs: Vec<f64> = (0..60).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = (0..60).map(|i| 9.0 + i as f64).collect();
        let closes: Vec<f64> = (0..60).map(|i| 9.5 + i as f64).collect();
        let out = adx(&highs, &lows, &closes, 14);
        let i = 50;
        assert!(out.plus_di[i].unwrap() > out.minus_di[i].unwrap());
    }

    #[test]
    fn too_short_series_is_all_none() {
        let highs = vec![10.0; 10];
        let lows = vec![9.0; 10];
        let closes = vec![9.5; 10];
        let out = adx(&highs, &lows, &closes, 14);
        assert!(out.adx.iter().all(|x| x.is_none()));
    }
}
