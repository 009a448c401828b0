use chakra_schemas::{DataFingerprint, Series};
use sha2::{Digest, Sha256};

/// `SHA-256(high_sum | low_sum | close_sum | row_count | first_ts | last_ts)`,
/// truncated to an 8-hex-char prefix (spec §3 `DataFingerprint`). Deterministic
/// and independent of source file format — it hashes the already-parsed
/// `Series`, not raw bytes, so a CSV and a Parquet version of the same data
/// fingerprint identically.
pub fn fingerprint_series(series: &Series) -> DataFingerprint {
    let high_sum: f64 = series.bars.iter().map(|b| b.high).sum();
    let low_sum: f64 = series.bars.iter().map(|b| b.low).sum();
    let close_sum: f64 = series.bars.iter().map(|b| b.close).sum();
    let row_count = series.bars.len() as u64;
    let first_ts = series.first_ts();
    let last_ts = series.last_ts();

    let mut hasher = Sha256::new();
    hasher.update(high_sum.to_bits().to_le_bytes());
    hasher.update(low_sum.to_bits().to_le_bytes());
    hasher.update(close_sum.to_bits().to_le_bytes());
    hasher.update(row_count.to_le_bytes());
    if let Some(ts) = first_ts {
        hasher.update(ts.timestamp_millis().to_le_bytes());
    }
    if let Some(ts) = last_ts {
        hasher.update(ts.timestamp_millis().to_le_bytes());
    }
    let digest = hasher.finalize();
    let hex_full = hex::encode(digest);
    DataFingerprint(hex_full[..8].to_string())
}
