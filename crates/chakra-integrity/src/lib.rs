//! chakra-integrity
//!
//! Data validation and fingerprinting for an input `Series` (spec §4.2).
//! `validate` runs five ordered structural/value/continuity/price-range/
//! cache-file checks and always returns a `ValidationReport` — validation
//! failures do not stop the engine from running; they become warnings or
//! errors carried alongside the result, never a thrown exception.

mod fingerprint;
mod report;
mod validate;

pub use fingerprint::fingerprint_series;
pub use report::{IntegrityCheck, ValidationReport};
pub use validate::{validate, validate_trade_price, PriceRangeViolation};
