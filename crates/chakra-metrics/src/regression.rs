//! Alpha/beta against a benchmark, via ordinary least squares over daily
//! returns (spec §4.7). The benchmark series is optional external input
//! (NIFTYBEES); callers that don't have one simply never call into here.

/// `portfolio_returns` and `benchmark_returns` must be the same length and
/// already aligned day-for-day. Returns `None` on a length mismatch, fewer
/// than two observations, or a benchmark with zero variance (no slope is
/// definable against a flat line).
pub fn alpha_beta(portfolio_returns: &[f64], benchmark_returns: &[f64]) -> Option<(f64, f64)> {
    if portfolio_returns.len() != benchmark_returns.len() || portfolio_returns.len() < 2 {
        return None;
    }
    let n = portfolio_returns.len() as f64;

    let mean_p = portfolio_returns.iter().sum::<f64>() / n;
    let mean_b = benchmark_returns.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut benchmark_variance = 0.0;
    for (p, b) in portfolio_returns.iter().zip(benchmark_returns) {
        covariance += (p - mean_p) * (b - mean_b);
        benchmark_variance += (b - mean_b).powi(2);
    }

    if benchmark_variance == 0.0 {
        return None;
    }

    let beta = covariance / benchmark_variance;
    let alpha = mean_p - beta * mean_b;
    Some((alpha, beta))
}
