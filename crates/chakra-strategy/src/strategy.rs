use chakra_schemas::{Bar, Series};
use chrono::{DateTime, Utc};

use crate::binder::IndicatorBinder;
use crate::error::StrategyError;

/// What `on_bar`/`on_entry` see at the bar currently being processed. The
/// engine advances `index` one bar at a time; a `SeriesHandle` bound
/// against this context can only ever see `index` or earlier (spec §4.3
/// one-bar-look-back rule).
#[derive(Clone, Copy, Debug)]
pub struct BarContext {
    pub index: usize,
    pub ts: DateTime<Utc>,
    pub bar: Bar,
}

impl BarContext {
    pub fn new(index: usize, ts: DateTime<Utc>, bar: Bar) -> Self {
        Self { index, ts, bar }
    }

    #[cfg(test)]
    pub(crate) fn for_test(index: usize) -> Self {
        use chrono::TimeZone;
        Self {
            index,
            ts: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            bar: Bar::new(
                Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                100.0,
                101.0,
                99.0,
                100.5,
                1000.0,
            ),
        }
    }
}

/// Read-only snapshot of engine-owned state, passed to `on_bar`/
/// `close_reason` (spec §4.4.1 step 4's "state dict").
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyState {
    pub qty: f64,
    pub avg_entry_price: f64,
    pub cash: f64,
    pub equity: f64,
    pub highest_high_since_entry: Option<f64>,
    pub bars_since_first_entry: u64,
}

/// Returned by `on_entry`, applied by the engine immediately after a fill
/// opens a new lot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryDirective {
    pub stop: Option<f64>,
    pub take_profit: Option<f64>,
    pub tag: Option<String>,
}

/// Returned by `on_bar`. Every field is "no change" when left at its
/// default — `enter_long`/`exit_long` default to `false`, `qty_multiplier`
/// defaults to `1.0` when `None` (spec §4.3 step 4). `stop` only ever
/// tightens (raises) every open lot's stop; `take_profit` only ever
/// tightens (lowers) every open lot's target, mirroring the same
/// never-loosens invariant from the other side of the price.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarDirective {
    pub enter_long: bool,
    pub exit_long: bool,
    pub stop: Option<f64>,
    pub take_profit: Option<f64>,
    pub qty_multiplier: Option<f64>,
    pub reason: Option<String>,
}

impl BarDirective {
    pub fn qty_multiplier_or_default(&self) -> f64 {
        self.qty_multiplier.unwrap_or(1.0)
    }
}

/// A strategy's lifecycle (spec §4.3). Implementations are instantiated
/// once per (symbol, run) — no shared mutable state crosses symbols — so
/// `on_bar`/`on_entry` take `&mut self` freely.
pub trait Strategy: Send {
    /// Optional preprocessing; default is the identity transform.
    fn prepare(&self, series: &Series) -> Series {
        series.clone()
    }

    /// Declare every indicator this strategy reads, via `binder.register`.
    /// Called exactly once before the bar loop starts.
    fn initialize(
        &mut self,
        series: &Series,
        binder: &mut IndicatorBinder,
    ) -> Result<(), StrategyError>;

    /// Called immediately after a fill opens a new lot.
    fn on_entry(&mut self, _ctx: &BarContext) -> EntryDirective {
        EntryDirective::default()
    }

    /// Called once per completed bar; returns directives that apply to the
    /// *next* bar.
    fn on_bar(&mut self, ctx: &BarContext, state: &StrategyState) -> BarDirective;

    /// Optional tag recorded on a terminal exit.
    fn close_reason(&self, _state: &StrategyState) -> Option<String> {
        None
    }
}
