//! Canonical multi-symbol trade stream ordering.
//!
//! Fills arrive pre-sorted per symbol (each engine runs its own bars in
//! order) but symbols are merged afterward, so ties on timestamp are
//! common: two symbols' bars can share a session close. The sort key
//! below is what makes the merged replay deterministic regardless of the
//! order the per-symbol results were collected in.
//!
//! Sort key (all ascending): `(timestamp, symbol, event_id)`. `event_id`
//! is assigned at merge time from each symbol's own trade order, so it
//! also breaks ties between same-symbol events that somehow share a
//! timestamp.

use chakra_schemas::TradeEvent;

/// A trade event tagged with the merge-assigned tiebreak id.
#[derive(Clone, Debug)]
pub struct TaggedEvent {
    pub event_id: u64,
    pub trade: TradeEvent,
}

/// Merge every symbol's trade stream into one, tagging each event with a
/// stable `event_id` (its original position in its own symbol's stream),
/// then sort canonically.
pub fn merge_canonical(runs: &[(&str, &[TradeEvent])]) -> Vec<TaggedEvent> {
    let mut events: Vec<TaggedEvent> = runs
        .iter()
        .flat_map(|(_, trades)| {
            trades
                .iter()
                .enumerate()
                .map(|(i, trade)| TaggedEvent {
                    event_id: i as u64,
                    trade: trade.clone(),
                })
        })
        .collect();
    sort_canonical(&mut events);
    events
}

/// Sort `events` in place by `(timestamp, symbol, event_id)` ascending.
pub fn sort_canonical(events: &mut [TaggedEvent]) {
    events.sort_by(|a, b| {
        let ts = a.trade.timestamp.cmp(&b.trade.timestamp);
        if ts != std::cmp::Ordering::Equal {
            return ts;
        }
        let sym = a.trade.symbol.cmp(&b.trade.symbol);
        if sym != std::cmp::Ordering::Equal {
            return sym;
        }
        a.event_id.cmp(&b.event_id)
    });
}

pub fn timestamps_are_sorted(events: &[TaggedEvent]) -> bool {
    events.windows(2).all(|w| w[0].trade.timestamp <= w[1].trade.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chakra_schemas::TradeEventKind;
    use chrono::{TimeZone, Utc};

    fn trade(symbol: &str, trade_id: u64, ts_secs: i64, kind: TradeEventKind) -> TradeEvent {
        TradeEvent {
            symbol: symbol.to_string(),
            trade_id,
            kind,
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
            price: 100.0,
            qty: 1.0,
            cash_delta: 0.0,
            realized_pnl: None,
            reason: String::new(),
        }
    }

    #[test]
    fn ties_on_timestamp_break_by_symbol_then_event_id() {
        let a = vec![trade("AAPL", 1, 1000, TradeEventKind::EntryLong)];
        let b = vec![trade("MSFT", 1, 1000, TradeEventKind::EntryLong)];
        let merged = merge_canonical(&[("MSFT", &b), ("AAPL", &a)]);

        assert_eq!(merged[0].trade.symbol, "AAPL");
        assert_eq!(merged[1].trade.symbol, "MSFT");
        assert!(timestamps_are_sorted(&merged));
    }

    #[test]
    fn chronological_order_wins_over_symbol_order() {
        let a = vec![trade("ZZZZ", 1, 500, TradeEventKind::EntryLong)];
        let b = vec![trade("AAAA", 1, 1000, TradeEventKind::EntryLong)];
        let merged = merge_canonical(&[("AAAA", &b), ("ZZZZ", &a)]);

        assert_eq!(merged[0].trade.symbol, "ZZZZ");
        assert_eq!(merged[1].trade.symbol, "AAAA");
    }
}
