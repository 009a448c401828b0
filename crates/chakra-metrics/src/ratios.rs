//! Textbook risk/return ratios over a daily-return series (spec §4.7).
//!
//! Every function here takes plain `&[f64]` and returns `Option<f64>` —
//! `None` means "not computable" (too few observations, zero variance),
//! never a panic or a silently wrong zero.

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Day-over-day simple returns from an equity curve. One element shorter
/// than `equity`.
pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Annualised Sharpe ratio: `mean(returns) / stdev(returns) * sqrt(252)`.
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return None;
    }
    Some(mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualised Sortino ratio: only downside deviations count against the
/// denominator.
pub fn sortino_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let downside_variance = returns
        .iter()
        .map(|r| if *r < 0.0 { r.powi(2) } else { 0.0 })
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    let downside_std = downside_variance.sqrt();
    if downside_std == 0.0 {
        return None;
    }
    Some(mean / downside_std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// CAGR from start/end equity over a span measured in calendar days.
pub fn cagr(start_equity: f64, end_equity: f64, span_days: f64) -> Option<f64> {
    if start_equity <= 0.0 || span_days <= 0.0 {
        return None;
    }
    let years = span_days / 365.25;
    Some((end_equity / start_equity).powf(1.0 / years) - 1.0)
}

/// Calmar ratio: CAGR divided by the magnitude of the max drawdown.
pub fn calmar_ratio(cagr: f64, max_drawdown_pct: f64) -> Option<f64> {
    if max_drawdown_pct == 0.0 {
        return None;
    }
    Some(cagr / max_drawdown_pct.abs())
}

/// `(running_peak, drawdown_abs)` → `(max_drawdown_abs, max_drawdown_pct)`.
/// `drawdown_pct` is expressed relative to the peak equity at the time.
pub fn max_drawdown(equity: &[f64]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut worst_abs = 0.0f64;
    let mut worst_pct = 0.0f64;
    for &e in equity {
        peak = peak.max(e);
        let dd_abs = e - peak;
        worst_abs = worst_abs.min(dd_abs);
        if peak > 0.0 {
            worst_pct = worst_pct.min(dd_abs / peak);
        }
    }
    (worst_abs, worst_pct)
}

/// `Σ wins / Σ |losses|`. `None` when there are no losing trades (either
/// undefined or "infinitely good" depending on convention — this crate
/// reports it as `None` rather than picking one).
pub fn profit_factor(pnls: &[f64]) -> Option<f64> {
    let gross_win: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
    let gross_loss: f64 = pnls.iter().filter(|p| **p < 0.0).map(|p| p.abs()).sum();
    if gross_loss == 0.0 {
        return None;
    }
    Some(gross_win / gross_loss)
}

/// Fraction of trades with positive P&L. `None` with zero trades.
pub fn win_rate(pnls: &[f64]) -> Option<f64> {
    if pnls.is_empty() {
        return None;
    }
    let wins = pnls.iter().filter(|p| **p > 0.0).count();
    Some(wins as f64 / pnls.len() as f64)
}
