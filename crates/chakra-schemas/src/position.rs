use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry tranche in a (possibly pyramided) position.
///
/// Per spec §9 Open Question resolution (DESIGN.md): each lot carries its
/// own stop and its own take-profit target. The engine's "stops only
/// tighten" rule (spec §4.4.1 step 5) is applied per lot independently, and
/// a StopHit/TpHit/terminal close liquidates every open lot at once (spec
/// has no per-lot partial-exit signal in the current strategy corpus).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub qty: f64,
    pub stop_price: Option<f64>,
    /// Per spec §9 Open Question resolution (DESIGN.md): mirrors
    /// `stop_price`'s per-lot shape, closed out the same way a `StopHit`
    /// is, via `Position::nearest_take_profit`.
    pub take_profit: Option<f64>,
}

/// An open position in one symbol, made up of one or more FIFO lots.
///
/// Invariant: `avg_entry_price == sum(entry_price * qty) / sum(qty)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub lots: Vec<Lot>,
}

impl Position {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            lots: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn open_qty(&self) -> f64 {
        self.lots.iter().map(|l| l.qty).sum()
    }

    /// Weighted-average entry price across all open lots (0.0 if flat).
    pub fn avg_entry_price(&self) -> f64 {
        let qty = self.open_qty();
        if qty <= 0.0 {
            return 0.0;
        }
        self.lots.iter().map(|l| l.entry_price * l.qty).sum::<f64>() / qty
    }

    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    pub fn add_lot(&mut self, lot: Lot) {
        self.lots.push(lot);
    }

    /// Tightest (highest) stop across all open lots — the price at which the
    /// *first* lot would be stopped out. Returns `None` if no lot has a stop.
    pub fn tightest_stop(&self) -> Option<f64> {
        self.lots
            .iter()
            .filter_map(|l| l.stop_price)
            .fold(None, |acc, s| match acc {
                None => Some(s),
                Some(a) => Some(a.max(s)),
            })
    }

    /// Raise every lot's stop to at least `new_stop` (longs only tighten).
    pub fn tighten_all_stops(&mut self, new_stop: f64) {
        for lot in &mut self.lots {
            lot.stop_price = Some(match lot.stop_price {
                Some(existing) => existing.max(new_stop),
                None => new_stop,
            });
        }
    }

    /// Nearest (lowest) take-profit target across all open lots — the price
    /// at which the *first* lot would take profit. `None` if no lot has one.
    pub fn nearest_take_profit(&self) -> Option<f64> {
        self.lots
            .iter()
            .filter_map(|l| l.take_profit)
            .fold(None, |acc, t| match acc {
                None => Some(t),
                Some(a) => Some(a.min(t)),
            })
    }

    /// Lower every lot's take-profit to at most `new_tp` (longs only lock in
    /// gains sooner, never push the target further away).
    pub fn tighten_all_take_profits(&mut self, new_tp: f64) {
        for lot in &mut self.lots {
            lot.take_profit = Some(match lot.take_profit {
                Some(existing) => existing.min(new_tp),
                None => new_tp,
            });
        }
    }

    pub fn clear(&mut self) {
        self.lots.clear();
    }
}

/// Per-symbol state that survives across bars within one engine run.
/// Cleared in full whenever the position closes completely (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistentState {
    pub highest_high_since_entry: Option<f64>,
    pub entry_price_of_first_lot: Option<f64>,
    pub bars_since_first_entry: u64,
    /// Strategy-owned scratch fields, keyed by the strategy's own naming —
    /// this is the one place a string key is acceptable: it is opaque to the
    /// engine and never used for indicator-snapshot serialization (that
    /// path uses the `IndicatorSnapshot` struct instead, see `trade.rs`).
    pub scratch: BTreeMap<String, f64>,
}

impl PersistentState {
    pub fn clear(&mut self) {
        *self = PersistentState::default();
    }

    pub fn on_new_first_entry(&mut self, entry_price: f64, high: f64) {
        self.entry_price_of_first_lot = Some(entry_price);
        self.highest_high_since_entry = Some(high);
        self.bars_since_first_entry = 0;
    }

    pub fn update_trailing(&mut self, bar_high: f64) {
        self.highest_high_since_entry = Some(match self.highest_high_since_entry {
            Some(prior) => prior.max(bar_high),
            None => bar_high,
        });
        self.bars_since_first_entry += 1;
    }
}
