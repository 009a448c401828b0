//! chakra-strategy
//!
//! The strategy plugin framework (spec §4.3): a `Strategy` trait with
//! lifecycle hooks, an indicator-binding handle that enforces the
//! no-look-ahead rule, and a registry mapping string keys to strategy
//! constructors with JSON parameter overrides. The bundled strategies live
//! under `strategies/`, one file each.

mod binder;
mod error;
mod registry;
mod strategy;
pub mod strategies;

pub use binder::{IndicatorBinder, SeriesHandle};
pub use error::StrategyError;
pub use registry::{StrategyFactory, StrategyMeta, StrategyRegistry};
pub use strategy::{BarContext, BarDirective, EntryDirective, Strategy, StrategyState};

pub use strategies::default_registry;
