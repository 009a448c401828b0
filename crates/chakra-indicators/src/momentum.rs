use crate::not_yet_valid;

/// Raw `period`-bar momentum: `close[i] - close[i - period]`.
pub fn momentum(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period == 0 || period >= n {
        return not_yet_valid(n);
    }
    let mut out = not_yet_valid(n);
    for i in period..n {
        out[i] = Some(closes[i] - closes[i - period]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_slope_yields_constant_momentum() {
        let v: Vec<f64> = (0..20).map(|i| i as f64 * 2.0).collect();
        let out = momentum(&v, 5);
        assert_eq!(out[10], Some(10.0));
        assert_eq!(out[19], Some(10.0));
    }
}
