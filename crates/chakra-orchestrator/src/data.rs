//! Loads one symbol's cached OHLCV CSV into a `chakra_schemas::Series`.
//!
//! Format (headers case-insensitive, order can vary):
//! `date,open,high,low,close,volume`. `date` is parsed as an RFC3339
//! timestamp if present, otherwise as a bare `YYYY-MM-DD` (midnight UTC).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chakra_schemas::{Bar, EquityPoint, Series};
use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::OrchestratorError;

const REQUIRED_HEADERS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

struct HeaderMap {
    idx: HashMap<String, usize>,
}

impl HeaderMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, OrchestratorError> {
        let mut idx = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            idx.insert(h.trim().to_ascii_lowercase(), i);
        }
        for req in REQUIRED_HEADERS {
            if !idx.contains_key(req) {
                return Err(OrchestratorError::Config(format!("cached series CSV missing required header: {req}")));
            }
        }
        Ok(Self { idx })
    }

    fn get<'a>(&self, rec: &'a csv::StringRecord, name: &str) -> Result<&'a str, OrchestratorError> {
        let i = self.idx[name];
        rec.get(i).ok_or_else(|| OrchestratorError::Config(format!("cached series CSV row missing '{name}' field")))
    }
}

fn parse_ts(raw: &str) -> Result<chrono::DateTime<Utc>, OrchestratorError> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap()))
        .map_err(|e| OrchestratorError::Config(format!("unparseable date '{raw}': {e}")))
}

fn parse_f64(raw: &str, field: &str) -> Result<f64, OrchestratorError> {
    raw.trim().parse::<f64>().map_err(|e| OrchestratorError::Config(format!("unparseable {field} '{raw}': {e}")))
}

/// Reads `<cache_dir>/<symbol>.csv` into a `Series`. Bars are trusted
/// as-is here; shape/monotonicity checks are `chakra-integrity`'s job.
pub fn load_series(cache_dir: &Path, symbol: &str) -> Result<Series, OrchestratorError> {
    let path = cache_dir.join(format!("{symbol}.csv"));
    let file = File::open(&path)
        .map_err(|e| OrchestratorError::Config(format!("failed to open cached series '{}': {e}", path.display())))?;

    let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| OrchestratorError::Config(format!("'{}' has no header row: {e}", path.display())))?
        .clone();
    let col = HeaderMap::from_headers(&headers)?;

    let mut bars = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| OrchestratorError::Config(format!("bad CSV row in '{}': {e}", path.display())))?;
        let ts = parse_ts(col.get(&rec, "date")?)?;
        let open = parse_f64(col.get(&rec, "open")?, "open")?;
        let high = parse_f64(col.get(&rec, "high")?, "high")?;
        let low = parse_f64(col.get(&rec, "low")?, "low")?;
        let close = parse_f64(col.get(&rec, "close")?, "close")?;
        let volume = parse_f64(col.get(&rec, "volume")?, "volume")?;
        bars.push(Bar::new(ts, open, high, low, close, volume));
    }

    Ok(Series::new(symbol, bars))
}

/// Turns a loaded benchmark `Series` into a buy-and-hold equity curve
/// (spec §4.7: alpha/beta "against a benchmark equity curve, NIFTYBEES
/// supplied as external input"). `daily_returns` only ever looks at
/// relative change bar-over-bar, so tracking each bar's close directly as
/// `positions_value` (with zero cash) is enough — the curve's absolute
/// scale never enters the regression.
pub fn benchmark_equity_curve(series: &Series) -> Vec<EquityPoint> {
    series.bars.iter().map(|bar| EquityPoint::new(bar.ts, 0.0, bar.close)).collect()
}
