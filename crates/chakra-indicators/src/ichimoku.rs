use crate::not_yet_valid;

/// Ichimoku Kinko Hyo output. `senkou_a`/`senkou_b` are already shifted
/// forward by `lead` bars (index `i` holds the cloud value that applies
/// *at* bar `i`, not the raw unshifted midpoint) so callers never have to
/// reason about the shift themselves. `chikou` is shifted backward by
/// `base` bars for the same reason.
#[derive(Clone, Debug, PartialEq)]
pub struct IchimokuOutput {
    pub tenkan: Vec<Option<f64>>,
    pub kijun: Vec<Option<f64>>,
    pub senkou_a: Vec<Option<f64>>,
    pub senkou_b: Vec<Option<f64>>,
    pub chikou: Vec<Option<f64>>,
}

fn midpoint(highs: &[f64], lows: &[f64], end: usize, period: usize) -> Option<f64> {
    if end + 1 < period {
        return None;
    }
    let start = end + 1 - period;
    let hh = highs[start..=end].iter().cloned().fold(f64::MIN, f64::max);
    let ll = lows[start..=end].iter().cloned().fold(f64::MAX, f64::min);
    Some((hh + ll) / 2.0)
}

/// `conv` (tenkan, default 9), `base` (kijun, default 26), `lead` (senkou B
/// span, default 52) mirror the classic defaults used by the Ichimoku
/// strategy bundled in `chakra-strategy`.
pub fn ichimoku(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    conv: usize,
    base: usize,
    lead: usize,
) -> IchimokuOutput {
    let n = highs.len();
    if lows.len() != n || closes.len() != n || conv == 0 || base == 0 || lead == 0 {
        return IchimokuOutput {
            tenkan: not_yet_valid(n),
            kijun: not_yet_valid(n),
            senkou_a: not_yet_valid(n),
            senkou_b: not_yet_valid(n),
            chikou: not_yet_valid(n),
        };
    }

    let tenkan: Vec<Option<f64>> = (0..n).map(|i| midpoint(highs, lows, i, conv)).collect();
    let kijun: Vec<Option<f64>> = (0..n).map(|i| midpoint(highs, lows, i, base)).collect();
    let senkou_b_raw: Vec<Option<f64>> = (0..n).map(|i| midpoint(highs, lows, i, lead)).collect();

    let mut senkou_a = not_yet_valid(n);
    let mut senkou_b = not_yet_valid(n);
    for i in 0..n {
        if i + base < n {
            senkou_a[i + base] = match (tenkan[i], kijun[i]) {
                (Some(t), Some(k)) => Some((t + k) / 2.0),
                _ => None,
            };
            senkou_b[i + base] = senkou_b_raw[i];
        }
    }

    let mut chikou = not_yet_valid(n);
    for i in base..n {
        chikou[i - base] = Some(closes[i]);
    }

    IchimokuOutput {
        tenkan,
        kijun,
        senkou_a,
        senkou_b,
        chikou,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenkan_needs_conv_bars_of_history() {
        let highs = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let lows = vec![9.0, 9.5, 10.0, 10.5, 11.0];
        let closes = vec![9.5, 10.0, 11.0, 12.0, 13.0];
        let out = ichimoku(&highs, &lows, &closes, 3, 4, 5);
        assert_eq!(out.tenkan[0], None);
        assert_eq!(out.tenkan[1], None);
        assert!(out.tenkan[2].is_some());
    }

    #[test]
    fn senkou_spans_are_forward_shifted() {
        let highs: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = (0..20).map(|i| 9.0 + i as f64).collect();
        let closes: Vec<f64> = (0..20).map(|i| 9.5 + i as f64).collect();
        let out = ichimoku(&highs, &lows, &closes, 3, 4, 6);
        assert!(out.senkou_a[..4].iter().all(|x| x.is_none()));
        assert!(out.senkou_a[4].is_some());
    }
}
