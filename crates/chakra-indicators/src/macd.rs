use crate::moving_average::ema;
use crate::not_yet_valid;

#[derive(Clone, Debug, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD line (`fast_ema - slow_ema`), its `signal_period`-EMA signal line,
/// and the histogram (`macd - signal`). Defaults used by the bundled
/// strategies are 12/26/9.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdOutput {
    let n = closes.len();
    if fast == 0 || slow == 0 || signal_period == 0 || slow >= n {
        return MacdOutput {
            macd: not_yet_valid(n),
            signal: not_yet_valid(n),
            histogram: not_yet_valid(n),
        };
    }

    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let first_valid = macd_line.iter().position(|v| v.is_some());
    let mut signal = not_yet_valid(n);
    let mut histogram = not_yet_valid(n);

    if let Some(start) = first_valid {
        let tail: Vec<f64> = macd_line[start..]
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        if tail.len() >= signal_period {
            let signal_tail = ema(&tail, signal_period);
            for (offset, s) in signal_tail.iter().enumerate() {
                if let Some(s) = s {
                    let idx = start + offset;
                    signal[idx] = Some(*s);
                    histogram[idx] = macd_line[idx].map(|m| m - s);
                }
            }
        }
    }

    MacdOutput {
        macd: macd_line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_yields_zero_macd() {
        let v = vec![10.0; 50];
        let out = macd(&v, 12, 26, 9);
        let last = out.macd[49].unwrap();
        assert!(last.abs() < 1e-9);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let v: Vec<f64> = (0..60).map(|i| 10.0 + i as f64 * 0.1).collect();
        let out = macd(&v, 12, 26, 9);
        let i = 55;
        if let (Some(m), Some(s), Some(h)) = (out.macd[i], out.signal[i], out.histogram[i]) {
            assert!((h - (m - s)).abs() < 1e-9);
        } else {
            panic!("expected valid values by index 55");
        }
    }
}
