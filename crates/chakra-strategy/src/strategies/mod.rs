//! The seven bundled strategies (spec §2 C3), one file each, plus the
//! `default_registry` that wires them all into a `StrategyRegistry` under
//! their canonical string keys.

mod bollinger_rsi;
mod candlestick;
mod ema_crossover;
mod envelope_kd;
mod ichimoku_cloud;
mod kama_crossover;
mod stoch_rsi_long;
mod util;

pub use bollinger_rsi::{BollingerRsiParams, BollingerRsiStrategy};
pub use candlestick::{CandlestickParams, CandlestickStrategy};
pub use ema_crossover::{EmaCrossoverParams, EmaCrossoverStrategy};
pub use envelope_kd::{EnvelopeKdParams, EnvelopeKdStrategy};
pub use ichimoku_cloud::{IchimokuParams, IchimokuStrategy};
pub use kama_crossover::{KamaCrossoverParams, KamaCrossoverStrategy};
pub use stoch_rsi_long::{StochRsiLongParams, StochRsiLongStrategy};

use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;
use util::parse_params;

/// Build the registry the CLI and orchestrator use out of the box: every
/// strategy bundled with the engine, keyed by its canonical name.
pub fn default_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();

    registry.register("ichimoku", "Ichimoku tenkan/kijun cross gated by cloud position", |params| {
        let p: IchimokuParams = parse_params(params)?;
        Ok(Box::new(IchimokuStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("ema_crossover", "Fast/slow EMA crossover", |params| {
        let p: EmaCrossoverParams = parse_params(params)?;
        Ok(Box::new(EmaCrossoverStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("kama_crossover", "Price vs. adaptive KAMA crossover", |params| {
        let p: KamaCrossoverParams = parse_params(params)?;
        Ok(Box::new(KamaCrossoverStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("envelope_kd", "SMA envelope bands gated by stochastic %K/%D", |params| {
        let p: EnvelopeKdParams = parse_params(params)?;
        Ok(Box::new(EnvelopeKdStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("stoch_rsi_long", "Stochastic RSI oversold/overbought long", |params| {
        let p: StochRsiLongParams = parse_params(params)?;
        Ok(Box::new(StochRsiLongStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("candlestick", "Bullish/bearish reversal candlestick patterns", |params| {
        let p: CandlestickParams = parse_params(params)?;
        Ok(Box::new(CandlestickStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry.register("bollinger_rsi", "Bollinger Bands gated by RSI", |params| {
        let p: BollingerRsiParams = parse_params(params)?;
        Ok(Box::new(BollingerRsiStrategy::new(p)) as Box<dyn Strategy>)
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_seven_bundled_strategies() {
        let registry = default_registry();
        for key in [
            "ichimoku",
            "ema_crossover",
            "kama_crossover",
            "envelope_kd",
            "stoch_rsi_long",
            "candlestick",
            "bollinger_rsi",
        ] {
            assert!(registry.contains(key), "missing strategy key: {key}");
        }
    }

    #[test]
    fn building_with_null_params_uses_defaults() {
        let registry = default_registry();
        let strategy = registry.build("ema_crossover", &serde_json::Value::Null);
        assert!(strategy.is_ok());
    }
}
