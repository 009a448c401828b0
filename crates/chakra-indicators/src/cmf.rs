use crate::not_yet_valid;

/// Chaikin Money Flow over `period` bars. A zero high-low range on a bar
/// contributes zero money-flow-volume for that bar (instead of dividing by
/// zero), matching the common charting-library convention for doji bars.
pub fn cmf(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    let n = highs.len();
    if period == 0
        || period > n
        || lows.len() != n
        || closes.len() != n
        || volumes.len() != n
    {
        return not_yet_valid(n);
    }

    let mfv: Vec<f64> = (0..n)
        .map(|i| {
            let range = highs[i] - lows[i];
            if range == 0.0 {
                0.0
            } else {
                let mfm = ((closes[i] - lows[i]) - (highs[i] - closes[i])) / range;
                mfm * volumes[i]
            }
        })
        .collect();

    let mut out = not_yet_valid(n);
    for i in (period - 1)..n {
        let start = i + 1 - period;
        let mfv_sum: f64 = mfv[start..=i].iter().sum();
        let vol_sum: f64 = volumes[start..=i].iter().sum();
        out[i] = Some(if vol_sum == 0.0 { 0.0 } else { mfv_sum / vol_sum });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_at_high_every_bar_is_strongly_positive() {
        let highs = vec![11.0; 10];
        let lows = vec![9.0; 10];
        let closes = vec![11.0; 10];
        let volumes = vec![1000.0; 10];
        let out = cmf(&highs, &lows, &closes, &volumes, 5);
        assert_eq!(out[4], Some(1.0));
    }

    #[test]
    fn zero_volume_is_neutral_zero() {
        let highs = vec![11.0; 10];
        let lows = vec![9.0; 10];
        let closes = vec![10.5; 10];
        let volumes = vec![0.0; 10];
        let out = cmf(&highs, &lows, &closes, &volumes, 5);
        assert_eq!(out[4], Some(0.0));
    }
}
