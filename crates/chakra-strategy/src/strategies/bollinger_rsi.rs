use chakra_indicators::{bollinger_bands, rsi};
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BollingerRsiParams {
    pub bb_period: usize,
    pub num_std: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for BollingerRsiParams {
    fn default() -> Self {
        Self {
            bb_period: 20,
            num_std: 2.0,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

/// Close at/below the lower Bollinger band with RSI oversold opens a long;
/// close at/above the upper band, or RSI overbought, closes it.
pub struct BollingerRsiStrategy {
    params: BollingerRsiParams,
    close: Option<SeriesHandle>,
    lower: Option<SeriesHandle>,
    upper: Option<SeriesHandle>,
    rsi: Option<SeriesHandle>,
}

impl BollingerRsiStrategy {
    pub fn new(params: BollingerRsiParams) -> Self {
        Self {
            params,
            close: None,
            lower: None,
            upper: None,
            rsi: None,
        }
    }
}

impl Strategy for BollingerRsiStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let closes = series.closes();
        let bands = bollinger_bands(&closes, self.params.bb_period, self.params.num_std);
        let rsi_series = rsi(&closes, self.params.rsi_period);

        let close_as_option: Vec<Option<f64>> = closes.iter().map(|c| Some(*c)).collect();
        self.close = Some(binder.register("close", close_as_option)?);
        self.lower = Some(binder.register("bb_lower", bands.lower)?);
        self.upper = Some(binder.register("bb_upper", bands.upper)?);
        self.rsi = Some(binder.register("rsi", rsi_series)?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let close = self.close.as_ref().unwrap().value_at(ctx);
        let lower = self.lower.as_ref().unwrap().value_at(ctx);
        let upper = self.upper.as_ref().unwrap().value_at(ctx);
        let rsi_val = self.rsi.as_ref().unwrap().value_at(ctx);

        let mut directive = BarDirective::default();
        let touched_lower = matches!((close, lower), (Some(c), Some(l)) if c <= l);
        let touched_upper = matches!((close, upper), (Some(c), Some(u)) if c >= u);
        let oversold = rsi_val.map(|r| r < self.params.rsi_oversold).unwrap_or(false);
        let overbought = rsi_val.map(|r| r > self.params.rsi_overbought).unwrap_or(false);

        if state.qty == 0.0 && touched_lower && oversold {
            directive.enter_long = true;
            directive.reason = Some("bb_lower_touch_with_rsi_oversold".to_string());
        } else if state.qty > 0.0 && (touched_upper || overbought) {
            directive.exit_long = true;
            directive.reason = Some("bb_upper_touch_or_rsi_overbought".to_string());
        }
        directive
    }
}
