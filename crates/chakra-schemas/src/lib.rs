//! chakra-schemas
//!
//! Shared data-model types for the backtest engine. Plain typed records and
//! parallel numeric columns — no dataframe, no reflective attribute access.
//! Every other crate in the workspace depends on this one and nothing else
//! upstream of it.

mod bar;
mod config;
mod fingerprint;
mod position;
mod trade;
mod window;

pub use bar::{Bar, Series};
pub use config::{BrokerConfig, Side};
pub use fingerprint::DataFingerprint;
pub use position::{Lot, PersistentState, Position};
pub use trade::{
    ConsolidatedTrade, EquityPoint, IndicatorSnapshot, TradeEvent, TradeEventKind, TrendClass,
    VolatilityClass, VolumeClass,
};
pub use window::{window_slices, WindowLabel, WindowSlice};
