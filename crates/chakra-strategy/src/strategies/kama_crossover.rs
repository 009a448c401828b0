use chakra_indicators::kama;
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

use super::util::{crossed_above, crossed_below};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct KamaCrossoverParams {
    pub period: usize,
    pub fast: usize,
    pub slow: usize,
}

impl Default for KamaCrossoverParams {
    fn default() -> Self {
        Self {
            period: 10,
            fast: 2,
            slow: 30,
        }
    }
}

/// Close price crossing above/below its KAMA line (spec §4.1 KAMA
/// contract). A single adaptive line rather than a fast/slow pair — the
/// "crossover" is price vs. the line itself.
pub struct KamaCrossoverStrategy {
    params: KamaCrossoverParams,
    close: Option<SeriesHandle>,
    kama: Option<SeriesHandle>,
}

impl KamaCrossoverStrategy {
    pub fn new(params: KamaCrossoverParams) -> Self {
        Self {
            params,
            close: None,
            kama: None,
        }
    }
}

impl Strategy for KamaCrossoverStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let closes = series.closes();
        let close_as_option: Vec<Option<f64>> = closes.iter().map(|c| Some(*c)).collect();
        self.close = Some(binder.register("close", close_as_option)?);
        self.kama = Some(binder.register(
            "kama",
            kama(&closes, self.params.period, self.params.fast, self.params.slow),
        )?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let close = self.close.as_ref().unwrap();
        let kama_line = self.kama.as_ref().unwrap();

        let cur_close = close.value_at(ctx);
        let cur_kama = kama_line.value_at(ctx);
        let prev_close = close.lookback(ctx, 1);
        let prev_kama = kama_line.lookback(ctx, 1);

        let mut directive = BarDirective::default();
        if state.qty == 0.0 && crossed_above(prev_close, prev_kama, cur_close, cur_kama) {
            directive.enter_long = true;
            directive.reason = Some("close_crossed_above_kama".to_string());
        } else if state.qty > 0.0 && crossed_below(prev_close, prev_kama, cur_close, cur_kama) {
            directive.exit_long = true;
            directive.reason = Some("close_crossed_below_kama".to_string());
        }
        directive
    }
}
