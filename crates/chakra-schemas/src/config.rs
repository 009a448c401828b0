use serde::{Deserialize, Serialize};

/// BUY or SELL for a fill. The current strategy corpus only opens long
/// positions (spec §4.4.2: Flat -> Long -> Flat), but fills themselves are
/// directional so the type carries both variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Process-wide, immutable-per-run broker/execution configuration.
///
/// `test_defaults()` / `conservative_defaults()` split: tests want
/// zero-friction determinism, real runs want realistic cost assumptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Starting cash, must be > 0.
    pub initial_capital: f64,
    /// Fraction of current equity sized into each new entry lot, `0 < x <= 1`.
    pub qty_pct_of_equity: f64,
    /// Round-trip commission rate applied to both entry and exit notional.
    pub commission_pct: f64,
    /// Slippage applied to fills, expressed in ticks.
    pub slippage_ticks: u32,
    /// Tick size used to convert `slippage_ticks` into a price adjustment.
    pub tick_size: f64,
    /// If true (default), signals generated on bar `i` fill at bar `i+1`'s open.
    pub execute_on_next_open: bool,
    /// Whether additional lots may be added to an already-open long position.
    pub allow_pyramiding: bool,
    /// Upper bound on concurrently open lots for one symbol.
    pub max_pyramid_lots: u32,
}

impl BrokerConfig {
    /// Deterministic, zero-friction defaults for unit tests: no commission,
    /// no slippage. **Not** for CLI/report use — see `conservative_defaults`.
    pub fn test_defaults() -> Self {
        Self {
            initial_capital: 100_000.0,
            qty_pct_of_equity: 0.10,
            commission_pct: 0.0,
            slippage_ticks: 0,
            tick_size: 0.05,
            execute_on_next_open: true,
            allow_pyramiding: false,
            max_pyramid_lots: 1,
        }
    }

    /// Realistic defaults for real evaluation: NSE-typical commission and a
    /// one-tick slippage allowance, pyramiding enabled up to 3 lots.
    pub fn conservative_defaults() -> Self {
        Self {
            initial_capital: 100_000.0,
            qty_pct_of_equity: 0.10,
            commission_pct: 0.001,
            slippage_ticks: 1,
            tick_size: 0.05,
            execute_on_next_open: true,
            allow_pyramiding: true,
            max_pyramid_lots: 3,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_capital > 0.0) {
            return Err("initial_capital must be > 0".into());
        }
        if !(self.qty_pct_of_equity > 0.0 && self.qty_pct_of_equity <= 1.0) {
            return Err("qty_pct_of_equity must be in (0, 1]".into());
        }
        if self.commission_pct < 0.0 {
            return Err("commission_pct must be >= 0".into());
        }
        if !(self.tick_size > 0.0) {
            return Err("tick_size must be > 0".into());
        }
        if self.max_pyramid_lots < 1 {
            return Err("max_pyramid_lots must be >= 1".into());
        }
        Ok(())
    }
}
