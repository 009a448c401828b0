use chakra_indicators::stochastic_rsi;
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct StochRsiLongParams {
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub d_smooth: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StochRsiLongParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_period: 14,
            d_smooth: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

/// Stochastic RSI %K rising back above the oversold threshold opens a
/// long; %K rising above the overbought threshold closes it.
pub struct StochRsiLongStrategy {
    params: StochRsiLongParams,
    k: Option<SeriesHandle>,
}

impl StochRsiLongStrategy {
    pub fn new(params: StochRsiLongParams) -> Self {
        Self { params, k: None }
    }
}

impl Strategy for StochRsiLongStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let closes = series.closes();
        let out = stochastic_rsi(
            &closes,
            self.params.rsi_period,
            self.params.stoch_period,
            self.params.d_smooth,
        );
        self.k = Some(binder.register("stoch_rsi_k", out.k)?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let k = self.k.as_ref().unwrap();
        let cur = k.value_at(ctx);
        let prev = k.lookback(ctx, 1);

        let mut directive = BarDirective::default();
        let crossed_above_oversold = matches!((prev, cur), (Some(p), Some(c)) if p <= self.params.oversold && c > self.params.oversold);
        let crossed_above_overbought = matches!((prev, cur), (Some(p), Some(c)) if p <= self.params.overbought && c > self.params.overbought);

        if state.qty == 0.0 && crossed_above_oversold {
            directive.enter_long = true;
            directive.reason = Some("stoch_rsi_crossed_above_oversold".to_string());
        } else if state.qty > 0.0 && crossed_above_overbought {
            directive.exit_long = true;
            directive.reason = Some("stoch_rsi_crossed_above_overbought".to_string());
        }
        directive
    }
}
