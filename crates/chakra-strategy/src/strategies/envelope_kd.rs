use chakra_indicators::{sma, stochastic};
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

use super::util::{crossed_above, crossed_below};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EnvelopeKdParams {
    pub sma_period: usize,
    pub envelope_pct: f64,
    pub k_period: usize,
    pub d_smooth: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for EnvelopeKdParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            envelope_pct: 0.025,
            k_period: 14,
            d_smooth: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

/// Price touching the lower SMA envelope band while %K crosses above %D in
/// oversold territory opens a long; price touching the upper band, or %K
/// crossing below %D in overbought territory, closes it.
pub struct EnvelopeKdStrategy {
    params: EnvelopeKdParams,
    close: Option<SeriesHandle>,
    lower_band: Option<SeriesHandle>,
    upper_band: Option<SeriesHandle>,
    k: Option<SeriesHandle>,
    d: Option<SeriesHandle>,
}

impl EnvelopeKdStrategy {
    pub fn new(params: EnvelopeKdParams) -> Self {
        Self {
            params,
            close: None,
            lower_band: None,
            upper_band: None,
            k: None,
            d: None,
        }
    }
}

impl Strategy for EnvelopeKdStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let middle = sma(&closes, self.params.sma_period);
        let pct = self.params.envelope_pct;
        let lower: Vec<Option<f64>> = middle.iter().map(|m| m.map(|v| v * (1.0 - pct))).collect();
        let upper: Vec<Option<f64>> = middle.iter().map(|m| m.map(|v| v * (1.0 + pct))).collect();

        let stoch = stochastic(&highs, &lows, &closes, self.params.k_period, self.params.d_smooth);

        let close_as_option: Vec<Option<f64>> = closes.iter().map(|c| Some(*c)).collect();
        self.close = Some(binder.register("close", close_as_option)?);
        self.lower_band = Some(binder.register("envelope_lower", lower)?);
        self.upper_band = Some(binder.register("envelope_upper", upper)?);
        self.k = Some(binder.register("stoch_k", stoch.k)?);
        self.d = Some(binder.register("stoch_d", stoch.d)?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let close = self.close.as_ref().unwrap().value_at(ctx);
        let lower = self.lower_band.as_ref().unwrap().value_at(ctx);
        let upper = self.upper_band.as_ref().unwrap().value_at(ctx);
        let cur_k = self.k.as_ref().unwrap().value_at(ctx);
        let cur_d = self.d.as_ref().unwrap().value_at(ctx);
        let prev_k = self.k.as_ref().unwrap().lookback(ctx, 1);
        let prev_d = self.d.as_ref().unwrap().lookback(ctx, 1);

        let mut directive = BarDirective::default();
        let touched_lower = matches!((close, lower), (Some(c), Some(l)) if c <= l);
        let touched_upper = matches!((close, upper), (Some(c), Some(u)) if c >= u);
        let k_crossed_up = crossed_above(prev_k, prev_d, cur_k, cur_d);
        let k_crossed_down = crossed_below(prev_k, prev_d, cur_k, cur_d);
        let oversold = cur_k.map(|k| k < self.params.oversold).unwrap_or(false);
        let overbought = cur_k.map(|k| k > self.params.overbought).unwrap_or(false);

        if state.qty == 0.0 && touched_lower && k_crossed_up && oversold {
            directive.enter_long = true;
            directive.reason = Some("envelope_lower_touch_with_kd_oversold_cross".to_string());
        } else if state.qty > 0.0 && (touched_upper || (k_crossed_down && overbought)) {
            directive.exit_long = true;
            directive.reason = Some("envelope_upper_touch_or_kd_overbought_cross".to_string());
        }
        directive
    }
}
