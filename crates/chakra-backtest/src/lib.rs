//! chakra-backtest
//!
//! The per-symbol event-sourced backtest engine (spec §4.4). Pipeline per
//! bar: fill pending orders at open -> update trailing state -> check
//! stops intra-bar -> invoke the strategy -> apply its directives -> record
//! the equity point. Long-only: one pending order at a time and a per-lot
//! `Position` are enough state to drive fills against completed bars.

mod engine;
mod types;

pub use engine::BacktestEngine;
pub use types::{BacktestConfig, BacktestError, BacktestReport};
