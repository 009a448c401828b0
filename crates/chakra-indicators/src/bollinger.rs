use crate::moving_average::sma;
use crate::not_yet_valid;

#[derive(Clone, Debug, PartialEq)]
pub struct BollingerOutput {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bollinger Bands: `period`-bar SMA middle band, `num_std` population
/// standard deviations above/below for the upper/lower bands.
pub fn bollinger_bands(closes: &[f64], period: usize, num_std: f64) -> BollingerOutput {
    let n = closes.len();
    let middle = sma(closes, period);
    if period == 0 || period > n {
        return BollingerOutput {
            middle,
            upper: not_yet_valid(n),
            lower: not_yet_valid(n),
        };
    }

    let mut upper = not_yet_valid(n);
    let mut lower = not_yet_valid(n);
    for i in (period - 1)..n {
        let start = i + 1 - period;
        let mean = middle[i].unwrap();
        let variance: f64 = closes[start..=i]
            .iter()
            .map(|c| (c - mean).powi(2))
            .sum::<f64>()
            / period as f64;
        let std_dev = variance.sqrt();
        upper[i] = Some(mean + num_std * std_dev);
        lower[i] = Some(mean - num_std * std_dev);
    }

    BollingerOutput {
        middle,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_collapses_bands_onto_the_mean() {
        let v = vec![10.0; 20];
        let out = bollinger_bands(&v, 10, 2.0);
        assert_eq!(out.upper[9], Some(10.0));
        assert_eq!(out.lower[9], Some(10.0));
    }

    #[test]
    fn bands_widen_with_volatility() {
        let v = vec![
            10.0, 12.0, 8.0, 13.0, 7.0, 11.0, 9.0, 14.0, 6.0, 10.0, 11.0, 9.0,
        ];
        let out = bollinger_bands(&v, 10, 2.0);
        let width = out.upper[9].unwrap() - out.lower[9].unwrap();
        assert!(width > 0.0);
    }
}
