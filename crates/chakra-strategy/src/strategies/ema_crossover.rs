use chakra_indicators::ema;
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

use super::util::{crossed_above, crossed_below};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EmaCrossoverParams {
    pub fast: usize,
    pub slow: usize,
}

impl Default for EmaCrossoverParams {
    fn default() -> Self {
        Self { fast: 12, slow: 26 }
    }
}

/// Fast EMA crossing above slow EMA opens a long; crossing below closes it.
pub struct EmaCrossoverStrategy {
    params: EmaCrossoverParams,
    fast: Option<SeriesHandle>,
    slow: Option<SeriesHandle>,
}

impl EmaCrossoverStrategy {
    pub fn new(params: EmaCrossoverParams) -> Self {
        Self {
            params,
            fast: None,
            slow: None,
        }
    }
}

impl Strategy for EmaCrossoverStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let closes = series.closes();
        self.fast = Some(binder.register("ema_fast", ema(&closes, self.params.fast))?);
        self.slow = Some(binder.register("ema_slow", ema(&closes, self.params.slow))?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let fast = self.fast.as_ref().unwrap();
        let slow = self.slow.as_ref().unwrap();

        let cur_fast = fast.value_at(ctx);
        let cur_slow = slow.value_at(ctx);
        let prev_fast = fast.lookback(ctx, 1);
        let prev_slow = slow.lookback(ctx, 1);

        let mut directive = BarDirective::default();
        if state.qty == 0.0 && crossed_above(prev_fast, prev_slow, cur_fast, cur_slow) {
            directive.enter_long = true;
            directive.reason = Some("ema_fast_crossed_above_ema_slow".to_string());
        } else if state.qty > 0.0 && crossed_below(prev_fast, prev_slow, cur_fast, cur_slow) {
            directive.exit_long = true;
            directive.reason = Some("ema_fast_crossed_below_ema_slow".to_string());
        }
        directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chakra_schemas::Bar;
    use chrono::{TimeZone, Utc};

    fn trending_series(n: usize) -> Series {
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + 0.5 * i as f64 + (i as f64 / 10.0).sin();
                Bar::new(
                    Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
                    close - 0.2,
                    close + 0.3,
                    close - 0.4,
                    close,
                    10_000.0,
                )
            })
            .collect();
        Series::new("TEST", bars)
    }

    #[test]
    fn eventually_signals_entry_on_a_trending_series() {
        let series = trending_series(300);
        let mut strat = EmaCrossoverStrategy::new(EmaCrossoverParams::default());
        let mut binder = IndicatorBinder::new();
        strat.initialize(&series, &mut binder).unwrap();

        let mut entered = false;
        for i in 0..series.len() {
            let ctx = BarContext::new(i, series.bars[i].ts, series.bars[i]);
            let state = StrategyState::default();
            let directive = strat.on_bar(&ctx, &state);
            if directive.enter_long {
                entered = true;
                break;
            }
        }
        assert!(entered);
    }
}
