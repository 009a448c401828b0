use crate::not_yet_valid;

/// Wilder-smoothed RSI. First valid index is `period`. A zero average loss
/// (all gains, or fewer than `period` non-zero moves) yields 100 rather
/// than a divide-by-zero.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period == 0 || period >= n {
        return not_yet_valid(n);
    }
    let mut out = not_yet_valid(n);

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }
    let mut avg_gain = gain_sum / period as f64;
    let mut avg_loss = loss_sum / period as f64;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in (period + 1)..n {
        let delta = closes[i] - closes[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_gains_is_pinned_at_100() {
        let v: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let out = rsi(&v, 14);
        assert_eq!(out[14], Some(100.0));
    }

    #[test]
    fn flat_series_is_neutral() {
        let v = vec![10.0; 20];
        let out = rsi(&v, 14);
        assert_eq!(out[14], Some(100.0));
    }

    #[test]
    fn mixed_series_stays_in_range() {
        let v = vec![
            10.0, 10.5, 10.2, 10.8, 10.6, 11.0, 10.9, 11.2, 11.0, 11.5, 11.3, 11.6, 11.4, 11.8,
            11.7, 12.0,
        ];
        let out = rsi(&v, 14);
        let last = out[15].unwrap();
        assert!((0.0..=100.0).contains(&last));
    }
}
