//! Shared-capital replay (spec §4.6 step 2, `CapitalMode::Shared`).
//!
//! Each `TradeEvent` already carries the cash impact its own per-symbol
//! engine computed (`cash_delta`, including slippage and commission) —
//! the ledger doesn't recompute fills, it just pools that cash impact
//! across every symbol and enforces one constraint the isolated engines
//! couldn't see: a shared balance that can go negative.

use std::collections::BTreeMap;

use chakra_schemas::{Position, TradeEvent, TradeEventKind};

use crate::ordering::TaggedEvent;

/// An entry the pool couldn't afford at the time it fired.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedEntry {
    pub symbol: String,
    pub trade_id: u64,
    pub shortfall: f64,
}

/// Replays a canonically-ordered, multi-symbol trade stream against one
/// pooled cash balance.
pub struct Ledger {
    cash: f64,
    realized_pnl: f64,
    positions: BTreeMap<String, Position>,
    dropped: Vec<DroppedEntry>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            realized_pnl: 0.0,
            positions: BTreeMap::new(),
            dropped: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn open_qty(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).map(|p| p.open_qty()).unwrap_or(0.0)
    }

    pub fn dropped(&self) -> &[DroppedEntry] {
        &self.dropped
    }

    /// Replay one event. Entries are rejected (and recorded) if the pool
    /// can't cover the notional; exits always apply, since a position
    /// this ledger tracks was necessarily opened by an entry it accepted.
    pub fn apply(&mut self, event: &TaggedEvent) {
        let trade = &event.trade;
        match trade.kind {
            TradeEventKind::EntryLong => self.apply_entry(trade),
            TradeEventKind::ExitLong | TradeEventKind::StopHit | TradeEventKind::TpHit => {
                self.apply_exit(trade)
            }
        }
    }

    fn apply_entry(&mut self, trade: &TradeEvent) {
        let cost = -trade.cash_delta;
        if cost > self.cash {
            self.dropped.push(DroppedEntry {
                symbol: trade.symbol.clone(),
                trade_id: trade.trade_id,
                shortfall: cost - self.cash,
            });
            return;
        }
        self.cash += trade.cash_delta;
        let pos = self
            .positions
            .entry(trade.symbol.clone())
            .or_insert_with(|| Position::new(trade.symbol.clone()));
        pos.add_lot(chakra_schemas::Lot {
            entry_time: trade.timestamp,
            entry_price: trade.price,
            qty: trade.qty,
            stop_price: None,
            take_profit: None,
        });
    }

    fn apply_exit(&mut self, trade: &TradeEvent) {
        self.cash += trade.cash_delta;
        self.realized_pnl += trade.realized_pnl.unwrap_or(0.0);
        if let Some(pos) = self.positions.get_mut(&trade.symbol) {
            pos.clear();
        }
    }
}
