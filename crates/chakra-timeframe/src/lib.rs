//! chakra-timeframe
//!
//! Bar resampling (spec §4.5): group contiguous input bars into coarser
//! target-interval bars (open = first, high = max, low = min, close =
//! last, volume = sum), with no synthetic fill for empty groups. Written
//! as pure stateless functions, same register as `chakra-indicators`.

mod aggregate;
mod error;
mod interval;

pub use aggregate::aggregate;
pub use error::AggregationError;
pub use interval::{parse as parse_interval, Interval, IntervalParseError};
