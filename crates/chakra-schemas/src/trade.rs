use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a raw engine-level trade event (spec §3 `TradeEvent`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeEventKind {
    EntryLong,
    ExitLong,
    StopHit,
    TpHit,
}

impl TradeEventKind {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeEventKind::EntryLong)
    }

    pub fn is_exit(&self) -> bool {
        !self.is_entry()
    }
}

/// A single fill-level event produced by the backtest engine.
///
/// Identified by a monotonically increasing `trade_id` *per symbol* (spec
/// §3). `realized_pnl` is populated for exits only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub symbol: String,
    pub trade_id: u64,
    pub kind: TradeEventKind,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub qty: f64,
    pub cash_delta: f64,
    pub realized_pnl: Option<f64>,
    pub reason: String,
}

/// Three-way pct-rank bucket used for volatility/trend/volume snapshot
/// classification (spec §4.7). `Unknown` only appears before enough history
/// has accumulated to compute a rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityClass {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendClass {
    Down,
    Sideways,
    Up,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeClass {
    Low,
    Medium,
    High,
}

/// Indicator values captured at entry time, lifted directly from the
/// already-computed indicator sequences (spec §4.7: "no re-fetch").
///
/// This is a typed struct, not a `HashMap<String, f64>` — the source bug
/// class this fixes (spec §9 DESIGN NOTES) was a hand-typed indicator key
/// (`stochrsi_bullish` vs `stoch_rsi_bullish`) silently producing an empty
/// CSV column. With named fields that typo is a compile error instead.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub rsi_bullish: Option<bool>,
    pub atr: Option<f64>,
    pub volatility_class: Option<VolatilityClass>,
    pub trend_class: Option<TrendClass>,
    pub macd_bullish: Option<bool>,
    pub ichimoku_above_cloud: Option<bool>,
    pub stoch_bullish: Option<bool>,
    pub stoch_rsi_bullish: Option<bool>,
    pub volume_class: Option<VolumeClass>,
}

/// An entry<->exit pair, built post-hoc from the raw `TradeEvent` stream.
///
/// Invariant: `max_favorable_excursion >= 0`, `max_adverse_excursion <= 0`;
/// percentages are computed against `entry_price * qty` (spec §9 Open
/// Question resolution: entry notional, not exit notional — see DESIGN.md).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedTrade {
    pub symbol: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub qty: f64,
    pub net_pnl_abs: Option<f64>,
    pub net_pnl_pct: Option<f64>,
    pub holding_bars: u64,
    pub holding_days: f64,
    pub max_favorable_excursion: f64,
    pub max_adverse_excursion: f64,
    pub snapshot: IndicatorSnapshot,
    pub close_reason: Option<String>,
    /// Set when `chakra-portfolio`'s post-hoc price-range check (spec §4.2
    /// check 4) flags either fill as outside the series' observed range.
    pub price_violation: Option<String>,
}

impl ConsolidatedTrade {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn is_profitable(&self) -> Option<bool> {
        self.net_pnl_abs.map(|p| p > 0.0)
    }

    fn entry_notional(&self) -> f64 {
        self.entry_price * self.qty
    }

    /// Run-up / drawdown expressed as a fraction of entry notional.
    pub fn run_up_pct(&self) -> f64 {
        let notional = self.entry_notional();
        if notional <= 0.0 {
            0.0
        } else {
            self.max_favorable_excursion / notional
        }
    }

    pub fn drawdown_pct(&self) -> f64 {
        let notional = self.entry_notional();
        if notional <= 0.0 {
            0.0
        } else {
            self.max_adverse_excursion / notional
        }
    }
}

/// One point on the equity curve.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub cash: f64,
    pub positions_value: f64,
    pub total_equity: f64,
    pub drawdown_abs: f64,
    pub drawdown_pct: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, cash: f64, positions_value: f64) -> Self {
        Self {
            timestamp,
            cash,
            positions_value,
            total_equity: cash + positions_value,
            drawdown_abs: 0.0,
            drawdown_pct: 0.0,
        }
    }
}
