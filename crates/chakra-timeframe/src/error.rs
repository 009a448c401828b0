use chrono::{DateTime, Utc};

/// Failure modes for `aggregate` (spec §7 `AggregationError`).
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// A bar's timestamp preceded an earlier bar's — `aggregate` requires
    /// its input pre-sorted, the same invariant `chakra-integrity` checks.
    UnsortedInput(DateTime<Utc>),
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsortedInput(ts) => write!(f, "input series is not sorted ascending: bar at {ts} is out of order"),
        }
    }
}

impl std::error::Error for AggregationError {}
