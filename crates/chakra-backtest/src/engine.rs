use std::panic::{catch_unwind, AssertUnwindSafe};

use chakra_integrity::validate;
use chakra_schemas::{Bar, DataFingerprint, EquityPoint, Lot, PersistentState, Position, Series, TradeEvent, TradeEventKind};
use chakra_strategy::{BarContext, BarDirective, IndicatorBinder, Strategy, StrategyState};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::types::{BacktestConfig, BacktestError, BacktestReport};

#[derive(Clone, Debug)]
enum PendingOrder {
    Buy { qty: f64, is_pyramid: bool, reason: String },
    Sell { qty: f64, reason: String },
}

/// Mutable state threaded through one symbol's bar loop. Grouped into a
/// struct so the free functions below don't need a dozen `&mut` params
/// each.
struct RunState {
    cash: f64,
    position: Position,
    persistent: PersistentState,
    pending: Option<PendingOrder>,
    current_stop: Option<f64>,
    current_take_profit: Option<f64>,
    next_trade_id: u64,
    trades: Vec<TradeEvent>,
    equity: Vec<EquityPoint>,
    running_peak: f64,
    warnings: Vec<String>,
}

/// Runs one strategy against one symbol's `Series` (spec §4.4).
pub struct BacktestEngine {
    config: BacktestConfig,
    strategy: Box<dyn Strategy>,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig, strategy: Box<dyn Strategy>) -> Self {
        Self { config, strategy }
    }

    pub fn run(&mut self, series: &Series) -> Result<BacktestReport, BacktestError> {
        self.config.validate().map_err(BacktestError::InvalidConfig)?;

        let validation = validate(series, &series.symbol, None);
        let data_fingerprint = validation
            .fingerprint
            .clone()
            .unwrap_or_else(|| DataFingerprint(String::new()));

        if series.is_empty() {
            return Ok(BacktestReport {
                symbol: series.symbol.clone(),
                trades: Vec::new(),
                equity: Vec::new(),
                data_fingerprint,
                warnings: validation.warnings.clone(),
                validation,
            });
        }

        let prepared = self.strategy.prepare(series);

        let mut binder = IndicatorBinder::new();
        catch_unwind(AssertUnwindSafe(|| self.strategy.initialize(&prepared, &mut binder)))
            .map_err(|e| BacktestError::StrategyPanic(panic_message(e)))?
            .map_err(|e| BacktestError::StrategyPanic(e.to_string()))?;

        let mut state = RunState {
            cash: self.config.initial_capital,
            position: Position::new(&prepared.symbol),
            persistent: PersistentState::default(),
            pending: None,
            current_stop: None,
            current_take_profit: None,
            next_trade_id: 1,
            trades: Vec::new(),
            equity: Vec::new(),
            running_peak: self.config.initial_capital,
            warnings: validation.warnings.clone(),
        };

        for (i, bar) in prepared.bars.iter().enumerate() {
            if !bar.is_finite() || !bar.is_price_consistent() {
                warn!(symbol = %prepared.symbol, bar = i, ts = %bar.ts, "bar skipped: NaN or inconsistent OHLC");
                state
                    .warnings
                    .push(format!("bar {i} at {} skipped: NaN or inconsistent OHLC", bar.ts));
                continue;
            }

            let ctx = BarContext::new(i, bar.ts, *bar);

            // 1. Fill any order queued on the previous bar, at this bar's open.
            if let Some(order) = state.pending.take() {
                fill_pending(&self.config, self.strategy.as_mut(), order, bar, &ctx, &mut state);
            }

            // 2. Update trailing state.
            if !state.position.is_flat() {
                state.persistent.update_trailing(bar.high);
            }

            // 3. Check stops intra-bar; a breach closes every open lot.
            if !state.position.is_flat() {
                if let Some(stop) = state.current_stop {
                    let gapped_through = bar.open < stop;
                    let touched = bar.low <= stop && stop <= bar.high;
                    if gapped_through || touched {
                        let fill_price = if gapped_through { bar.open } else { stop };
                        info!(symbol = %prepared.symbol, price = fill_price, ts = %bar.ts, "stop hit, all lots closed");
                        close_all(&self.config, fill_price, bar.ts, TradeEventKind::StopHit, "stop_hit", &mut state);
                        state.pending = None;
                    }
                }
            }

            // 3b. Check take-profit intra-bar, same shape as the stop check
            // above but on the high side; skipped if the stop above already
            // closed the position this bar.
            if !state.position.is_flat() {
                if let Some(tp) = state.current_take_profit {
                    let gapped_through = bar.open > tp;
                    let touched = bar.low <= tp && tp <= bar.high;
                    if gapped_through || touched {
                        let fill_price = if gapped_through { bar.open } else { tp };
                        info!(symbol = %prepared.symbol, price = fill_price, ts = %bar.ts, "take-profit hit, all lots closed");
                        close_all(&self.config, fill_price, bar.ts, TradeEventKind::TpHit, "tp_hit", &mut state);
                        state.pending = None;
                    }
                }
            }

            // 4. Invoke the strategy for this bar.
            let snapshot = StrategyState {
                qty: state.position.open_qty(),
                avg_entry_price: state.position.avg_entry_price(),
                cash: state.cash,
                equity: state.cash + state.position.open_qty() * bar.close,
                highest_high_since_entry: state.persistent.highest_high_since_entry,
                bars_since_first_entry: state.persistent.bars_since_first_entry,
            };
            let directive = catch_unwind(AssertUnwindSafe(|| self.strategy.on_bar(&ctx, &snapshot)))
                .map_err(|e| BacktestError::StrategyPanic(panic_message(e)))?;

            // 5. Apply directives: queue next fill, tighten stops.
            apply_directive(&self.config, &directive, bar, &snapshot, &mut state);
            if let Some(new_stop) = directive.stop {
                if !state.position.is_flat() {
                    state.position.tighten_all_stops(new_stop);
                    state.current_stop = state.position.tightest_stop();
                }
            }
            if let Some(new_tp) = directive.take_profit {
                if !state.position.is_flat() {
                    state.position.tighten_all_take_profits(new_tp);
                    state.current_take_profit = state.position.nearest_take_profit();
                }
            }

            // 6. Record the equity point.
            let positions_value = state.position.open_qty() * bar.close;
            let mut point = EquityPoint::new(bar.ts, state.cash, positions_value);
            state.running_peak = state.running_peak.max(point.total_equity);
            point.drawdown_abs = point.total_equity - state.running_peak;
            point.drawdown_pct = if state.running_peak > 0.0 {
                point.drawdown_abs / state.running_peak
            } else {
                0.0
            };
            state.equity.push(point);
        }

        Ok(BacktestReport {
            symbol: series.symbol.clone(),
            trades: state.trades,
            equity: state.equity,
            data_fingerprint,
            validation,
            warnings: state.warnings,
        })
    }
}

fn fill_pending(
    config: &BacktestConfig,
    strategy: &mut dyn Strategy,
    order: PendingOrder,
    bar: &Bar,
    ctx: &BarContext,
    state: &mut RunState,
) {
    let tick = config.slippage_ticks as f64 * config.tick_size;
    match order {
        PendingOrder::Buy { qty, is_pyramid, reason } => {
            let fill_price = bar.open + tick;
            let notional = qty * fill_price;
            let commission = config.commission_pct * notional;
            let total_cost = notional + commission;
            if total_cost > state.cash {
                warn!(ts = %bar.ts, %qty, price = fill_price, cash = state.cash, "buy dropped, insufficient cash");
                state.warnings.push(format!(
                    "{}: buy of {qty} @ {fill_price} dropped, insufficient cash ({total_cost} > {})",
                    bar.ts, state.cash
                ));
                return;
            }
            state.cash -= total_cost;
            state.position.add_lot(Lot {
                entry_time: bar.ts,
                entry_price: fill_price,
                qty,
                stop_price: None,
                take_profit: None,
            });
            if !is_pyramid {
                state.persistent.on_new_first_entry(fill_price, bar.high);
            }
            state.trades.push(TradeEvent {
                symbol: state.position.symbol.clone(),
                trade_id: state.next_trade_id,
                kind: TradeEventKind::EntryLong,
                timestamp: bar.ts,
                price: fill_price,
                qty,
                cash_delta: -total_cost,
                realized_pnl: None,
                reason,
            });
            state.next_trade_id += 1;

            let entry_directive = strategy.on_entry(ctx);
            if let Some(stop) = entry_directive.stop {
                if let Some(last_lot) = state.position.lots.last_mut() {
                    last_lot.stop_price = Some(stop);
                }
            }
            if let Some(take_profit) = entry_directive.take_profit {
                if let Some(last_lot) = state.position.lots.last_mut() {
                    last_lot.take_profit = Some(take_profit);
                }
            }
            state.current_stop = state.position.tightest_stop();
            state.current_take_profit = state.position.nearest_take_profit();
        }
        PendingOrder::Sell { qty, reason } => {
            let fill_price = (bar.open - tick).max(0.0);
            settle_exit(config, qty, fill_price, bar.ts, TradeEventKind::ExitLong, &reason, state);
        }
    }
}

fn settle_exit(
    config: &BacktestConfig,
    qty: f64,
    fill_price: f64,
    ts: DateTime<Utc>,
    kind: TradeEventKind,
    reason: &str,
    state: &mut RunState,
) {
    let notional = qty * fill_price;
    let commission = config.commission_pct * notional;
    let proceeds = notional - commission;
    let avg_entry = state.position.avg_entry_price();
    let realized_pnl = (fill_price - avg_entry) * qty - commission;

    state.cash += proceeds;
    state.trades.push(TradeEvent {
        symbol: state.position.symbol.clone(),
        trade_id: state.next_trade_id,
        kind,
        timestamp: ts,
        price: fill_price,
        qty,
        cash_delta: proceeds,
        realized_pnl: Some(realized_pnl),
        reason: reason.to_string(),
    });
    state.next_trade_id += 1;

    state.position.clear();
    state.persistent.clear();
    state.current_stop = None;
    state.current_take_profit = None;
}

fn close_all(
    config: &BacktestConfig,
    fill_price: f64,
    ts: DateTime<Utc>,
    kind: TradeEventKind,
    reason: &str,
    state: &mut RunState,
) {
    let qty = state.position.open_qty();
    if qty <= 0.0 {
        return;
    }
    settle_exit(config, qty, fill_price, ts, kind, reason, state);
}

fn apply_directive(
    config: &BacktestConfig,
    directive: &BarDirective,
    bar: &Bar,
    snapshot: &StrategyState,
    state: &mut RunState,
) {
    let qty_multiplier = directive.qty_multiplier_or_default();
    let reason = directive.reason.clone().unwrap_or_default();

    if directive.exit_long && snapshot.qty > 0.0 {
        state.pending = Some(PendingOrder::Sell {
            qty: snapshot.qty,
            reason,
        });
        return;
    }

    if !directive.enter_long {
        return;
    }

    if state.position.is_flat() {
        let qty = compute_qty(snapshot.equity, bar.close, config.qty_pct_of_equity * qty_multiplier);
        if qty > 0.0 {
            state.pending = Some(PendingOrder::Buy {
                qty,
                is_pyramid: false,
                reason,
            });
        }
        return;
    }

    if config.allow_pyramiding && state.position.lot_count() < config.max_pyramid_lots as usize {
        let last_entry = state
            .position
            .lots
            .last()
            .map(|l| l.entry_price)
            .unwrap_or(f64::INFINITY);
        if bar.close > last_entry {
            let qty = compute_qty(snapshot.equity, bar.close, config.qty_pct_of_equity * qty_multiplier);
            if qty > 0.0 {
                state.pending = Some(PendingOrder::Buy {
                    qty,
                    is_pyramid: true,
                    reason,
                });
            }
        }
    }
}

/// `floor(equity * weight / close)`, minimum 1 share when anything at all
/// is affordable.
fn compute_qty(equity: f64, close: f64, weight: f64) -> f64 {
    if close <= 0.0 || equity <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    (equity * weight / close).floor().max(1.0)
}

fn panic_message(e: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = e.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy callback panicked with a non-string payload".to_string()
    }
}
