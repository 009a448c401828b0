//! chakra-indicators
//!
//! Pure functions over numeric sequences (spec §4.1). Every function takes
//! one or more aligned `&[f64]` slices plus scalar parameters and returns a
//! `Vec<Option<f64>>` (or a struct of several such vectors) the same length
//! as the input. Leading values are `None` ("not-yet-valid", spec Glossary)
//! until enough history has accumulated — callers (the strategy indicator
//! binder in `chakra-strategy`) must never coerce `None` into a valid
//! number.
//!
//! All functions are restartable: no hidden state survives a call, and
//! none of them panic on malformed input (empty slices, a period of zero,
//! mismatched slice lengths) — they return an all-`None` series instead,
//! matching the "tagged result, never exceptions" doctrine carried from the
//! teacher's engine-boundary error style.

mod adx;
mod aroon;
mod atr;
mod bollinger;
mod cmf;
mod ichimoku;
mod kama;
mod macd;
mod momentum;
mod moving_average;
mod rsi;
mod stochastic;
mod supertrend;

pub use adx::{adx, AdxOutput};
pub use aroon::{aroon, AroonOutput};
pub use atr::atr;
pub use bollinger::{bollinger_bands, BollingerOutput};
pub use cmf::cmf;
pub use ichimoku::{ichimoku, IchimokuOutput};
pub use kama::kama;
pub use macd::{macd, MacdOutput};
pub use momentum::momentum;
pub use moving_average::{ema, sma};
pub use rsi::rsi;
pub use stochastic::{stochastic, stochastic_rsi, StochasticOutput};
pub use supertrend::{supertrend, SupertrendOutput};

/// Shared guard: a period must be >= 1 and not exceed the series length for
/// any output index to ever be valid. Indicators call this first and return
/// an all-`None` vector of the right length when it fails, rather than
/// panicking or dividing by zero.
pub(crate) fn not_yet_valid(len: usize) -> Vec<Option<f64>> {
    vec![None; len]
}
