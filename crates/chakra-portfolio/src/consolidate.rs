//! Pairs raw entry/exit `TradeEvent`s into `ConsolidatedTrade`s (spec §4.6
//! step 4). The backtest engine always closes a whole position in one
//! exit event — pyramided entries accumulate until one exit event drains
//! all of them — so consolidation is "collect the pending entries for
//! this symbol, then fold them into one trade on the matching exit",
//! no partial-fill bookkeeping required.

use std::collections::HashMap;

use chakra_integrity::validate_trade_price;
use chakra_schemas::{ConsolidatedTrade, EquityPoint, IndicatorSnapshot, TradeEvent, TradeEventKind};

fn bars_between(
    equity: &[EquityPoint],
    entry_ts: chrono::DateTime<chrono::Utc>,
    exit_ts: chrono::DateTime<chrono::Utc>,
) -> u64 {
    equity
        .iter()
        .filter(|p| p.timestamp >= entry_ts && p.timestamp <= exit_ts)
        .count() as u64
}

fn mark_to_market_excursion(
    equity: &[EquityPoint],
    entry_ts: chrono::DateTime<chrono::Utc>,
    exit_ts: chrono::DateTime<chrono::Utc>,
    entry_notional: f64,
) -> (f64, f64) {
    let mut mfe = 0.0f64;
    let mut mae = 0.0f64;
    for point in equity {
        if point.timestamp < entry_ts || point.timestamp > exit_ts {
            continue;
        }
        let excursion = point.positions_value - entry_notional;
        mfe = mfe.max(excursion);
        mae = mae.min(excursion);
    }
    (mfe, mae)
}

/// Build every symbol's `ConsolidatedTrade`s from its raw trade stream.
pub fn consolidate(symbol: &str, trades: &[TradeEvent], equity: &[EquityPoint]) -> Vec<ConsolidatedTrade> {
    let mut pending: Vec<&TradeEvent> = Vec::new();
    let mut out = Vec::new();

    for trade in trades {
        match trade.kind {
            TradeEventKind::EntryLong => pending.push(trade),
            TradeEventKind::ExitLong | TradeEventKind::StopHit | TradeEventKind::TpHit => {
                if pending.is_empty() {
                    continue;
                }
                let qty: f64 = pending.iter().map(|e| e.qty).sum();
                let entry_notional: f64 = pending.iter().map(|e| e.price * e.qty).sum();
                let entry_price = if qty > 0.0 { entry_notional / qty } else { 0.0 };
                let entry_time = pending[0].timestamp;

                let (mfe, mae) = mark_to_market_excursion(equity, entry_time, trade.timestamp, entry_notional);

                let net_pnl_abs = trade.realized_pnl.unwrap_or(0.0);
                let net_pnl_pct = if entry_notional > 0.0 { net_pnl_abs / entry_notional } else { 0.0 };

                let holding_bars = bars_between(equity, entry_time, trade.timestamp);
                let holding_days = (trade.timestamp - entry_time).num_seconds() as f64 / 86_400.0;

                out.push(ConsolidatedTrade {
                    symbol: symbol.to_string(),
                    entry_time,
                    exit_time: Some(trade.timestamp),
                    entry_price,
                    exit_price: Some(trade.price),
                    qty,
                    net_pnl_abs: Some(net_pnl_abs),
                    net_pnl_pct: Some(net_pnl_pct),
                    holding_bars,
                    holding_days,
                    max_favorable_excursion: mfe,
                    max_adverse_excursion: mae,
                    snapshot: IndicatorSnapshot::default(),
                    close_reason: Some(trade.reason.clone()),
                    price_violation: None,
                });
                pending.clear();
            }
        }
    }

    // A still-open position at the end of the run: one open ConsolidatedTrade.
    if !pending.is_empty() {
        let qty: f64 = pending.iter().map(|e| e.qty).sum();
        let entry_notional: f64 = pending.iter().map(|e| e.price * e.qty).sum();
        let entry_price = if qty > 0.0 { entry_notional / qty } else { 0.0 };
        let entry_time = pending[0].timestamp;
        let last_ts = equity.last().map(|p| p.timestamp).unwrap_or(entry_time);
        let (mfe, mae) = mark_to_market_excursion(equity, entry_time, last_ts, entry_notional);

        out.push(ConsolidatedTrade {
            symbol: symbol.to_string(),
            entry_time,
            exit_time: None,
            entry_price,
            exit_price: None,
            qty,
            net_pnl_abs: None,
            net_pnl_pct: None,
            holding_bars: bars_between(equity, entry_time, last_ts),
            holding_days: (last_ts - entry_time).num_seconds() as f64 / 86_400.0,
            max_favorable_excursion: mfe,
            max_adverse_excursion: mae,
            snapshot: IndicatorSnapshot::default(),
            close_reason: None,
            price_violation: None,
        });
    }

    out
}

/// Flags any trade whose entry or exit fill price falls outside the
/// series' observed `[min_low*0.99, max_high*1.01]` range (spec §4.2 check
/// 4), attaching a human-readable message to the trade itself. Entry is
/// checked first; an entry violation takes precedence over an exit one
/// when both are present, since the entry is what a reader would look at
/// first while triaging a flagged trade.
pub fn validate_trade_prices(trades: &mut [ConsolidatedTrade], min_low: f64, max_high: f64) {
    for trade in trades.iter_mut() {
        let entry_violation = validate_trade_price(min_low, max_high, trade.entry_price).err();
        let exit_violation = trade.exit_price.and_then(|p| validate_trade_price(min_low, max_high, p).err());
        trade.price_violation = entry_violation
            .map(|v| format!("entry price {:.2} outside allowed range [{:.2}, {:.2}]", v.price, v.allowed_min, v.allowed_max))
            .or_else(|| {
                exit_violation
                    .map(|v| format!("exit price {:.2} outside allowed range [{:.2}, {:.2}]", v.price, v.allowed_min, v.allowed_max))
            });
    }
}

/// `consolidate` for every symbol in `runs`, keyed the same way.
pub fn consolidate_all<'a>(
    runs: impl IntoIterator<Item = (&'a str, &'a [TradeEvent], &'a [EquityPoint])>,
) -> HashMap<String, Vec<ConsolidatedTrade>> {
    runs.into_iter()
        .map(|(symbol, trades, equity)| (symbol.to_string(), consolidate(symbol, trades, equity)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(day: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day)
    }

    fn trade(entry_price: f64, exit_price: Option<f64>) -> ConsolidatedTrade {
        ConsolidatedTrade {
            symbol: "TEST".to_string(),
            entry_time: ts(0),
            exit_time: exit_price.map(|_| ts(5)),
            entry_price,
            exit_price,
            qty: 10.0,
            net_pnl_abs: None,
            net_pnl_pct: None,
            holding_bars: 5,
            holding_days: 5.0,
            max_favorable_excursion: 0.0,
            max_adverse_excursion: 0.0,
            snapshot: IndicatorSnapshot::default(),
            close_reason: None,
            price_violation: None,
        }
    }

    #[test]
    fn in_range_fills_get_no_violation() {
        let mut trades = vec![trade(100.0, Some(105.0))];
        validate_trade_prices(&mut trades, 95.0, 110.0);
        assert!(trades[0].price_violation.is_none());
    }

    #[test]
    fn an_out_of_range_exit_price_is_flagged() {
        let mut trades = vec![trade(100.0, Some(200.0))];
        validate_trade_prices(&mut trades, 95.0, 110.0);
        assert!(trades[0].price_violation.as_ref().unwrap().contains("exit price"));
    }

    #[test]
    fn an_out_of_range_entry_price_takes_precedence_over_an_out_of_range_exit() {
        let mut trades = vec![trade(10.0, Some(200.0))];
        validate_trade_prices(&mut trades, 95.0, 110.0);
        assert!(trades[0].price_violation.as_ref().unwrap().contains("entry price"));
    }
}
