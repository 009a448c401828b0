use crate::not_yet_valid;

#[derive(Clone, Debug, PartialEq)]
pub struct AroonOutput {
    pub up: Vec<Option<f64>>,
    pub down: Vec<Option<f64>>,
}

/// Aroon Up/Down over a `period`-bar window: how recently (as a percentage
/// of the window) the highest high / lowest low occurred. A window with a
/// single bar (period == 1) always yields 100/100 since that bar is both
/// the newest and the extreme.
pub fn aroon(highs: &[f64], lows: &[f64], period: usize) -> AroonOutput {
    let n = highs.len();
    if period == 0 || period >= n || lows.len() != n {
        return AroonOutput {
            up: not_yet_valid(n),
            down: not_yet_valid(n),
        };
    }

    let mut up = not_yet_valid(n);
    let mut down = not_yet_valid(n);

    for i in period..n {
        let start = i - period;
        let window_h = &highs[start..=i];
        let window_l = &lows[start..=i];

        let hh_offset = window_h
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        let ll_offset = window_l
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();

        let bars_since_high = period - hh_offset;
        let bars_since_low = period - ll_offset;
        up[i] = Some((period as f64 - bars_since_high as f64) / period as f64 * 100.0);
        down[i] = Some((period as f64 - bars_since_low as f64) / period as f64 * 100.0);
    }

    AroonOutput { up, down }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_on_last_bar_gives_aroon_up_one_hundred() {
        let highs = vec![10.0, 11.0, 12.0, 13.0, 20.0];
        let lows = vec![9.0, 9.0, 9.0, 9.0, 9.0];
        let out = aroon(&highs, &lows, 4);
        assert_eq!(out.up[4], Some(100.0));
    }

    #[test]
    fn low_on_last_bar_gives_aroon_down_one_hundred() {
        let highs = vec![10.0, 10.0, 10.0, 10.0, 10.0];
        let lows = vec![9.0, 8.0, 7.0, 6.0, 2.0];
        let out = aroon(&highs, &lows, 4);
        assert_eq!(out.down[4], Some(100.0));
    }
}
