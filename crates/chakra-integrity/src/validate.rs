use std::path::Path;

use chakra_schemas::Series;

use crate::fingerprint::fingerprint_series;
use crate::report::{IntegrityCheck, SeriesStats, ValidationReport};

const MIN_ROWS: usize = 100;
const MAX_NAN_FRACTION: f64 = 0.10;
const DAILY_GAP_WARNING_DAYS: i64 = 7;
const INTRADAY_GAP_WARNING_MULTIPLE: i64 = 2;

/// Run the five ordered checks from spec §4.2 against `series` and return a
/// `ValidationReport`. Every check always runs — a structural failure does
/// not short-circuit the value/continuity checks — matching the
/// "first failure still runs remaining checks" rule.
///
/// `cache_file` is the optional on-disk cache path backing this series
/// (check 5); pass `None` when the series was loaded without a cache file.
pub fn validate(series: &Series, symbol: &str, cache_file: Option<&Path>) -> ValidationReport {
    let mut checks = Vec::new();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    check_structure(series, &mut checks, &mut errors);
    let stats = check_values(series, &mut checks, &mut errors);
    check_continuity(series, &mut checks, &mut warnings);
    check_cache_file(cache_file, &mut checks, &mut errors);

    let passed = checks.iter().all(|c| c.passed);
    let fingerprint = if series.is_empty() {
        None
    } else {
        Some(fingerprint_series(series))
    };

    if !passed {
        warnings.push(format!("{symbol}: one or more integrity checks failed"));
    }

    ValidationReport {
        passed,
        checks,
        warnings,
        errors,
        stats,
        fingerprint,
    }
}

fn check_structure(series: &Series, checks: &mut Vec<IntegrityCheck>, errors: &mut Vec<String>) {
    let monotonic = series
        .bars
        .windows(2)
        .all(|w| w[1].ts > w[0].ts);
    let enough_rows = series.len() >= MIN_ROWS;

    let passed = monotonic && enough_rows;
    let message = if !monotonic {
        "timestamps are not strictly monotonically increasing".to_string()
    } else if !enough_rows {
        format!("only {} rows, minimum is {MIN_ROWS}", series.len())
    } else {
        "ok".to_string()
    };
    if !passed {
        errors.push(message.clone());
    }
    checks.push(IntegrityCheck {
        name: "structure",
        passed,
        message,
    });
}

fn check_values(
    series: &Series,
    checks: &mut Vec<IntegrityCheck>,
    errors: &mut Vec<String>,
) -> SeriesStats {
    let n = series.len().max(1) as f64;
    let mut nan_open = 0usize;
    let mut nan_high = 0usize;
    let mut nan_low = 0usize;
    let mut nan_close = 0usize;
    let mut nan_volume = 0usize;
    let mut row_violations = 0usize;
    let mut non_positive = 0usize;

    for bar in &series.bars {
        if bar.open.is_nan() {
            nan_open += 1;
        }
        if bar.high.is_nan() {
            nan_high += 1;
        }
        if bar.low.is_nan() {
            nan_low += 1;
        }
        if bar.close.is_nan() {
            nan_close += 1;
        }
        if bar.volume.is_nan() {
            nan_volume += 1;
        }
        if !bar.high.is_nan() && !bar.low.is_nan() && bar.high < bar.low {
            row_violations += 1;
        }
        if !bar.close.is_nan()
            && !bar.low.is_nan()
            && !bar.high.is_nan()
            && (bar.close < bar.low || bar.close > bar.high)
        {
            row_violations += 1;
        }
        if [bar.open, bar.high, bar.low, bar.close]
            .iter()
            .any(|p| !p.is_nan() && *p <= 0.0)
        {
            non_positive += 1;
        }
    }

    let stats = SeriesStats {
        row_count: series.len(),
        nan_fraction_open: nan_open as f64 / n,
        nan_fraction_high: nan_high as f64 / n,
        nan_fraction_low: nan_low as f64 / n,
        nan_fraction_close: nan_close as f64 / n,
        nan_fraction_volume: nan_volume as f64 / n,
    };

    let nan_ok = [
        stats.nan_fraction_open,
        stats.nan_fraction_high,
        stats.nan_fraction_low,
        stats.nan_fraction_close,
        stats.nan_fraction_volume,
    ]
    .iter()
    .all(|f| *f <= MAX_NAN_FRACTION);

    let passed = nan_ok && row_violations == 0 && non_positive == 0;
    let message = if !nan_ok {
        "a column exceeds the 10% not-a-number budget".to_string()
    } else if row_violations > 0 {
        format!("{row_violations} row(s) violate low <= open,close <= high")
    } else if non_positive > 0 {
        format!("{non_positive} row(s) have a non-positive price")
    } else {
        "ok".to_string()
    };
    if !passed {
        errors.push(message.clone());
    }
    checks.push(IntegrityCheck {
        name: "values",
        passed,
        message,
    });

    stats
}

fn check_continuity(series: &Series, checks: &mut Vec<IntegrityCheck>, warnings: &mut Vec<String>) {
    if series.len() < 2 {
        checks.push(IntegrityCheck {
            name: "continuity",
            passed: true,
            message: "insufficient rows to assess continuity".to_string(),
        });
        return;
    }

    let deltas: Vec<i64> = series
        .bars
        .windows(2)
        .map(|w| (w[1].ts - w[0].ts).num_seconds())
        .collect();
    let nominal = median(&deltas);
    let is_daily_cadence = nominal >= 20 * 3600;

    let mut gap_count = 0usize;
    for &delta in &deltas {
        let flagged = if is_daily_cadence {
            delta > DAILY_GAP_WARNING_DAYS * 86_400
        } else {
            delta > INTRADAY_GAP_WARNING_MULTIPLE * nominal.max(1)
        };
        if flagged {
            gap_count += 1;
        }
    }

    if gap_count > 0 {
        warnings.push(format!("{gap_count} continuity gap(s) beyond the warning threshold"));
    }

    checks.push(IntegrityCheck {
        name: "continuity",
        passed: true,
        message: format!("{gap_count} gap warning(s)"),
    });
}

fn check_cache_file(
    cache_file: Option<&Path>,
    checks: &mut Vec<IntegrityCheck>,
    errors: &mut Vec<String>,
) {
    let (passed, message) = match cache_file {
        None => (true, "no cache file provided".to_string()),
        Some(path) => match std::fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => (true, "ok".to_string()),
            Ok(_) => (false, format!("cache file {} is empty", path.display())),
            Err(e) => (false, format!("cache file {} unreadable: {e}", path.display())),
        },
    };
    if !passed {
        errors.push(message.clone());
    }
    checks.push(IntegrityCheck {
        name: "cache_file",
        passed,
        message,
    });
}

fn median(values: &[i64]) -> i64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted[sorted.len() / 2]
}

/// A price-range sanity violation found while validating an entry/exit fill
/// price against a series' observed range (spec §4.2 check 4). These
/// become errors attached to the trade, not warnings — the failure
/// semantics differ from the bar-level checks above.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRangeViolation {
    pub price: f64,
    pub allowed_min: f64,
    pub allowed_max: f64,
}

/// Check that a trade fill `price` falls within `[min_low*0.99,
/// max_high*1.01]` of the series it traded against. Called post-hoc, once
/// per fill, rather than as part of the bar-level `validate` pass.
pub fn validate_trade_price(
    min_low: f64,
    max_high: f64,
    price: f64,
) -> Result<(), PriceRangeViolation> {
    let allowed_min = min_low * 0.99;
    let allowed_max = max_high * 1.01;
    if price < allowed_min || price > allowed_max {
        Err(PriceRangeViolation {
            price,
            allowed_min,
            allowed_max,
        })
    } else {
        Ok(())
    }
}
