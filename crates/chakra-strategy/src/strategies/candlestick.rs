use chakra_schemas::Series;
use serde::Deserialize;

use crate::binder::{IndicatorBinder, SeriesHandle};
use crate::error::StrategyError;
use crate::strategy::{BarContext, BarDirective, Strategy, StrategyState};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CandlestickParams {
    /// Lower-wick-to-body ratio a hammer must clear.
    pub hammer_wick_ratio: f64,
}

impl Default for CandlestickParams {
    fn default() -> Self {
        Self {
            hammer_wick_ratio: 2.0,
        }
    }
}

/// Bullish reversal candlestick patterns (bullish engulfing, hammer) open a
/// long; a bearish engulfing pattern while in position closes it. Reads
/// raw OHLC directly rather than a derived indicator — registered as
/// plain pass-through handles so the one-bar-look-back discipline still
/// applies to the previous bar's OHLC.
pub struct CandlestickStrategy {
    params: CandlestickParams,
    open: Option<SeriesHandle>,
    high: Option<SeriesHandle>,
    low: Option<SeriesHandle>,
    close: Option<SeriesHandle>,
}

impl CandlestickStrategy {
    pub fn new(params: CandlestickParams) -> Self {
        Self {
            params,
            open: None,
            high: None,
            low: None,
            close: None,
        }
    }

    fn is_bullish_engulfing(&self, ctx: &BarContext) -> bool {
        let (po, pc) = match (self.open.as_ref().unwrap().lookback(ctx, 1), self.close.as_ref().unwrap().lookback(ctx, 1)) {
            (Some(o), Some(c)) => (o, c),
            _ => return false,
        };
        let (co, cc) = match (self.open.as_ref().unwrap().value_at(ctx), self.close.as_ref().unwrap().value_at(ctx)) {
            (Some(o), Some(c)) => (o, c),
            _ => return false,
        };
        let prev_bearish = pc < po;
        let cur_bullish = cc > co;
        prev_bearish && cur_bullish && co <= pc && cc >= po
    }

    fn is_bearish_engulfing(&self, ctx: &BarContext) -> bool {
        let (po, pc) = match (self.open.as_ref().unwrap().lookback(ctx, 1), self.close.as_ref().unwrap().lookback(ctx, 1)) {
            (Some(o), Some(c)) => (o, c),
            _ => return false,
        };
        let (co, cc) = match (self.open.as_ref().unwrap().value_at(ctx), self.close.as_ref().unwrap().value_at(ctx)) {
            (Some(o), Some(c)) => (o, c),
            _ => return false,
        };
        let prev_bullish = pc > po;
        let cur_bearish = cc < co;
        prev_bullish && cur_bearish && co >= pc && cc <= po
    }

    fn is_hammer(&self, ctx: &BarContext) -> bool {
        let (o, h, l, c) = match (
            self.open.as_ref().unwrap().value_at(ctx),
            self.high.as_ref().unwrap().value_at(ctx),
            self.low.as_ref().unwrap().value_at(ctx),
            self.close.as_ref().unwrap().value_at(ctx),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => return false,
        };
        let body = (c - o).abs();
        if body == 0.0 {
            return false;
        }
        let lower_wick = o.min(c) - l;
        let upper_wick = h - o.max(c);
        lower_wick >= self.params.hammer_wick_ratio * body && upper_wick <= body
    }
}

impl Strategy for CandlestickStrategy {
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError> {
        let as_option = |v: Vec<f64>| -> Vec<Option<f64>> { v.into_iter().map(Some).collect() };
        self.open = Some(binder.register(
            "open",
            as_option(series.bars.iter().map(|b| b.open).collect()),
        )?);
        self.high = Some(binder.register("high", as_option(series.highs()))?);
        self.low = Some(binder.register("low", as_option(series.lows()))?);
        self.close = Some(binder.register("close", as_option(series.closes()))?);
        Ok(())
    }

    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective {
        let mut directive = BarDirective::default();
        if state.qty == 0.0 && (self.is_bullish_engulfing(ctx) || self.is_hammer(ctx)) {
            directive.enter_long = true;
            directive.reason = Some("bullish_reversal_candlestick".to_string());
        } else if state.qty > 0.0 && self.is_bearish_engulfing(ctx) {
            directive.exit_long = true;
            directive.reason = Some("bearish_engulfing".to_string());
        }
        directive
    }
}
