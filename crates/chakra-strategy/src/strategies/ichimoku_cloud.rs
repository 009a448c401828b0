use chakra_indicators::ichimoku;
use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

use super::util::crossed_above;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub conv: usize,
    pub base: usize,
    pub lead: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            conv: 9,
            base: 26,
            lead: 52,
        }
    }
}

/// Tenkan crossing above kijun while price sits above the cloud opens a
/// long; tenkan crossing back below kijun closes it.
pub struct IchimokuStrategy {
    params: IchimokuParams,
    close: Option<SeriesHandle>,
    tenkan: Option<SeriesHandle>,
    kijun: Option<SeriesHandle>,
    senkou_a: Option<SeriesHandle>,
    senkou_b: Option<SeriesHandle>,
}

impl IchimokuStrategy {
    pub fn new(params: IchimokuParams) -> Self {
        Self {
            params,
            close: None,
            tenkan: None,
            kijun: None,
            senkou_a: None,
            senkou_b: None,
        }
    }

    fn above_cloud(&self, ctx: &BarContext) -> bool {
        match (
            self.close.as_ref().unwrap().value_at(ctx),
            self.senkou_a.as_ref().unwrap().value_at(ctx),
            self.senkou_b.as_ref().unwrap().value_at(ctx),
        ) {
            (Some(close), Some(a), Some(b)) => close > a.max(b),
            _ => false,
        }
    }
}

impl Strategy for IchimokuStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let highs = series.highs();
        let lows = series.lows();
        let closes = series.closes();
        let out = ichimoku(&highs, &lows, &closes, self.params.conv, self.params.base, self.params.lead);

        let close_as_option: Vec<Option<f64>> = closes.iter().map(|c| Some(*c)).collect();
        self.close = Some(binder.register("close", close_as_option)?);
        self.tenkan = Some(binder.register("tenkan", out.tenkan)?);
        self.kijun = Some(binder.register("kijun", out.kijun)?);
        self.senkou_a = Some(binder.register("senkou_a", out.senkou_a)?);
        self.senkou_b = Some(binder.register("senkou_b", out.senkou_b)?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let tenkan = self.tenkan.as_ref().unwrap();
        let kijun = self.kijun.as_ref().unwrap();

        let cur_tenkan = tenkan.value_at(ctx);
        let cur_kijun = kijun.value_at(ctx);
        let prev_tenkan = tenkan.lookback(ctx, 1);
        let prev_kijun = kijun.lookback(ctx, 1);

        let mut directive = BarDirective::default();
        if state.qty == 0.0
            && crossed_above(prev_tenkan, prev_kijun, cur_tenkan, cur_kijun)
            && self.above_cloud(ctx)
        {
            directive.enter_long = true;
            directive.reason = Some("tenkan_crossed_above_kijun_above_cloud".to_string());
        } else if state.qty > 0.0 {
            if let (Some(t), Some(k)) = (cur_tenkan, cur_kijun) {
                if t < k {
                    directive.exit_long = true;
                    directive.reason = Some("tenkan_crossed_below_kijun".to_string());
                }
            }
        }
        directive
    }
}
