use std::collections::HashSet;
use std::rc::Rc;

use crate::error::StrategyError;
use crate::strategy::BarContext;

/// An index-aligned, read-only view over one fully precomputed indicator
/// sequence. Replaces the source's decorator-based `self.I(fn, args)`
/// lazy wrapper (spec §9) with an explicit handle returned by the binder.
///
/// `value_at`/`lookback` both take a `&BarContext` rather than a bare
/// index: the context only ever carries the index of the bar currently
/// being processed, so there is no way for a strategy to reach for
/// `ctx.index + 1` through this API — out-of-range and not-yet-computed
/// reads both fall back to the same `None` sentinel.
#[derive(Clone)]
pub struct SeriesHandle {
    data: Rc<Vec<Option<f64>>>,
}

impl SeriesHandle {
    fn new(data: Vec<Option<f64>>) -> Self {
        Self { data: Rc::new(data) }
    }

    /// The value at the bar `ctx` is currently pointing at.
    pub fn value_at(&self, ctx: &BarContext) -> Option<f64> {
        self.data.get(ctx.index).copied().flatten()
    }

    /// The value `bars_back` bars before `ctx`'s current index (0 = the
    /// current bar). Reads before index 0 return `None`, matching the
    /// not-yet-valid sentinel.
    pub fn lookback(&self, ctx: &BarContext, bars_back: usize) -> Option<f64> {
        ctx.index
            .checked_sub(bars_back)
            .and_then(|i| self.data.get(i).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Handed to `Strategy::initialize`; strategies call `register` once per
/// indicator they need. A second `register` call with the same key is a
/// `StrategyError::DuplicateBinding`, matching spec §4.3's "re-binding is
/// an error" rule.
#[derive(Default)]
pub struct IndicatorBinder {
    registered: HashSet<String>,
}

impl IndicatorBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: &str,
        values: Vec<Option<f64>>,
    ) -> Result<SeriesHandle, StrategyError> {
        if !self.registered.insert(key.to_string()) {
            return Err(StrategyError::DuplicateBinding(key.to_string()));
        }
        Ok(SeriesHandle::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_at(index: usize) -> BarContext {
        BarContext::for_test(index)
    }

    #[test]
    fn value_at_returns_none_for_not_yet_valid() {
        let handle = SeriesHandle::new(vec![None, None, Some(1.0), Some(2.0)]);
        assert_eq!(handle.value_at(&ctx_at(0)), None);
        assert_eq!(handle.value_at(&ctx_at(2)), Some(1.0));
    }

    #[test]
    fn lookback_before_series_start_is_none() {
        let handle = SeriesHandle::new(vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(handle.lookback(&ctx_at(0), 1), None);
        assert_eq!(handle.lookback(&ctx_at(2), 1), Some(2.0));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut binder = IndicatorBinder::new();
        binder.register("rsi14", vec![Some(50.0)]).unwrap();
        let err = binder.register("rsi14", vec![Some(60.0)]);
        assert_eq!(err, Err(StrategyError::DuplicateBinding("rsi14".to_string())));
    }
}
