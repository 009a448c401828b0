use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Look-back window label used for metrics reporting (spec §3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindowLabel {
    OneYear,
    ThreeYear,
    FiveYear,
    Max,
}

impl WindowLabel {
    pub const ALL: [WindowLabel; 4] = [
        WindowLabel::OneYear,
        WindowLabel::ThreeYear,
        WindowLabel::FiveYear,
        WindowLabel::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowLabel::OneYear => "1Y",
            WindowLabel::ThreeYear => "3Y",
            WindowLabel::FiveYear => "5Y",
            WindowLabel::Max => "MAX",
        }
    }

    pub fn years(&self) -> Option<i64> {
        match self {
            WindowLabel::OneYear => Some(1),
            WindowLabel::ThreeYear => Some(3),
            WindowLabel::FiveYear => Some(5),
            WindowLabel::Max => None,
        }
    }
}

impl std::fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete `[start_ts, end_ts]` slice of the run's time range, derived
/// from the data's end date (spec §3: "not wall clock").
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowSlice {
    pub label: WindowLabel,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
}

impl WindowSlice {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start_ts && ts <= self.end_ts
    }
}

/// Build the {1Y, 3Y, 5Y, MAX} window slices anchored on `data_end`.
pub fn window_slices(data_start: DateTime<Utc>, data_end: DateTime<Utc>) -> Vec<WindowSlice> {
    WindowLabel::ALL
        .iter()
        .map(|&label| {
            let start_ts = match label.years() {
                Some(years) => {
                    let candidate = data_end - chrono::Duration::days(365 * years);
                    candidate.max(data_start)
                }
                None => data_start,
            };
            WindowSlice {
                label,
                start_ts,
                end_ts: data_end,
            }
        })
        .collect()
}
