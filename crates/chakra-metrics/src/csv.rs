//! CSV row formatting (spec §6). Built the same way the rest of this
//! lineage writes CSVs: a header constant plus `format!`-built rows pushed
//! onto a `String`, never `csv::Writer` (that crate is for reading the
//! symbol data in, not for writing reports out).

use chakra_schemas::{ConsolidatedTrade, IndicatorSnapshot, TrendClass, VolatilityClass, VolumeClass};
use chrono::{DateTime, Utc};

use crate::window_metrics::WindowMetrics;

/// Round to 2 decimal places for display only; every computation upstream
/// of this module keeps full `f64` precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", round2(v))).unwrap_or_default()
}

fn opt_bool(value: Option<bool>) -> String {
    value.map(bool_str).unwrap_or_default().to_string()
}

fn opt_volatility(value: Option<VolatilityClass>) -> String {
    match value {
        Some(VolatilityClass::Low) => "Low".to_string(),
        Some(VolatilityClass::Medium) => "Medium".to_string(),
        Some(VolatilityClass::High) => "High".to_string(),
        None => String::new(),
    }
}

fn opt_trend(value: Option<TrendClass>) -> String {
    match value {
        Some(TrendClass::Up) => "Up".to_string(),
        Some(TrendClass::Down) => "Down".to_string(),
        Some(TrendClass::Sideways) => "Sideways".to_string(),
        None => String::new(),
    }
}

fn opt_volume(value: Option<VolumeClass>) -> String {
    match value {
        Some(VolumeClass::Low) => "Low".to_string(),
        Some(VolumeClass::Medium) => "Medium".to_string(),
        Some(VolumeClass::High) => "High".to_string(),
        None => String::new(),
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

const INDICATOR_COLUMNS: &str =
    "RSI,RSI Bullish,ATR,Volatility Class,Trend Class,MACD Bullish,Ichimoku Above Cloud,Stoch Bullish,StochRSI Bullish,Volume Class";

pub const CONSOLIDATED_TRADES_HEADER: &str = "Trade#,Symbol,Type,Date/Time,Price,Quantity,Net P&L INR,Net P&L %,Profitable,Run-up INR,Run-up %,Drawdown INR,Drawdown %,Holding Days,RSI,RSI Bullish,ATR,Volatility Class,Trend Class,MACD Bullish,Ichimoku Above Cloud,Stoch Bullish,StochRSI Bullish,Volume Class";

fn indicator_columns(snapshot: &IndicatorSnapshot) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        opt_f64(snapshot.rsi),
        opt_bool(snapshot.rsi_bullish),
        opt_f64(snapshot.atr),
        opt_volatility(snapshot.volatility_class),
        opt_trend(snapshot.trend_class),
        opt_bool(snapshot.macd_bullish),
        opt_bool(snapshot.ichimoku_above_cloud),
        opt_bool(snapshot.stoch_bullish),
        opt_bool(snapshot.stoch_rsi_bullish),
        opt_volume(snapshot.volume_class),
    )
}

/// The entry row and exit row for one `ConsolidatedTrade` (spec §6: "Entry
/// rows have empty P&L / Profitable fields; exit rows have non-empty").
/// Still-open trades use `now` for the exit row's date and holding-day
/// count and are tagged `"OPEN"` instead of `"Exit long"`.
pub fn consolidated_trade_rows(trade_number: u64, trade: &ConsolidatedTrade, now: DateTime<Utc>) -> [String; 2] {
    let run_up_inr = trade.max_favorable_excursion;
    let drawdown_inr = trade.max_adverse_excursion;
    let run_up_pct = trade.run_up_pct();
    let drawdown_pct = trade.drawdown_pct();

    let entry_row = format!(
        "{},{},Entry long,{},{:.2},{:.2},,,,{:.2},{:.2},{:.2},{:.2},,{}",
        trade_number,
        csv_escape(&trade.symbol),
        trade.entry_time.to_rfc3339(),
        round2(trade.entry_price),
        round2(trade.qty),
        round2(run_up_inr),
        round2(run_up_pct * 100.0),
        round2(drawdown_inr),
        round2(drawdown_pct * 100.0),
        indicator_columns(&IndicatorSnapshot::default()),
    );

    let (exit_type, exit_ts, exit_price, holding_days) = match (trade.exit_time, trade.exit_price) {
        (Some(ts), Some(price)) => ("Exit long", ts, price, trade.holding_days),
        _ => {
            let elapsed_days = (now - trade.entry_time).num_seconds() as f64 / 86_400.0;
            ("OPEN", now, trade.entry_price, elapsed_days)
        }
    };

    let profitable = trade.is_profitable().map(|p| if p { "Yes" } else { "No" }).unwrap_or("");

    let exit_row = format!(
        "{},{},{},{},{:.2},{:.2},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
        trade_number,
        csv_escape(&trade.symbol),
        exit_type,
        exit_ts.to_rfc3339(),
        round2(exit_price),
        round2(trade.qty),
        opt_f64(trade.net_pnl_abs),
        trade.net_pnl_pct.map(|p| format!("{:.2}", round2(p * 100.0))).unwrap_or_default(),
        profitable,
        round2(run_up_inr),
        round2(run_up_pct * 100.0),
        round2(drawdown_inr),
        round2(drawdown_pct * 100.0),
        round2(holding_days),
        indicator_columns(&trade.snapshot),
    );

    [entry_row, exit_row]
}

pub const PORTFOLIO_KEY_METRICS_HEADER: &str =
    "Symbol,Trades,Wins,Losses,Win Rate %,Net P&L %,Avg Trade %,Profit Factor,Max DD %,CAGR %,Sharpe,Sortino,Calmar,IRR %";

/// One `Symbol, ...` row (also used for the portfolio-total row, with
/// `symbol` set to `"PORTFOLIO"`).
pub fn portfolio_key_metrics_row(symbol: &str, metrics: &WindowMetrics) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        csv_escape(symbol),
        metrics.trades,
        metrics.wins,
        metrics.losses,
        metrics.win_rate.map(|v| format!("{:.2}", round2(v * 100.0))).unwrap_or_default(),
        metrics.total_pnl_pct.map(|v| format!("{:.2}", round2(v * 100.0))).unwrap_or_default(),
        metrics.avg_trade_pnl_pct.map(|v| format!("{:.2}", round2(v * 100.0))).unwrap_or_default(),
        opt_f64(metrics.profit_factor),
        format!("{:.2}", round2(metrics.max_drawdown_pct * 100.0)),
        metrics.cagr.map(|v| format!("{:.2}", round2(v * 100.0))).unwrap_or_default(),
        opt_f64(metrics.sharpe),
        opt_f64(metrics.sortino),
        opt_f64(metrics.calmar),
        metrics.irr.map(|v| format!("{:.2}", round2(v * 100.0))).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day)
    }

    #[test]
    fn round2_rounds_half_up_to_two_decimals() {
        assert!((round2(1.005) - 1.01).abs() < 1e-9 || (round2(1.005) - 1.0).abs() < 1e-9);
        assert_eq!(round2(1.2345), 1.23);
    }

    #[test]
    fn closed_trade_produces_entry_and_exit_rows_with_pnl_only_on_exit() {
        let trade = ConsolidatedTrade {
            symbol: "INFY".to_string(),
            entry_time: ts(0),
            exit_time: Some(ts(5)),
            entry_price: 100.0,
            exit_price: Some(110.0),
            qty: 10.0,
            net_pnl_abs: Some(100.0),
            net_pnl_pct: Some(0.1),
            holding_bars: 5,
            holding_days: 5.0,
            max_favorable_excursion: 150.0,
            max_adverse_excursion: -20.0,
            snapshot: IndicatorSnapshot::default(),
            close_reason: Some("signal".to_string()),
            price_violation: None,
        };
        let [entry, exit] = consolidated_trade_rows(1, &trade, ts(10));
        assert!(entry.contains("Entry long"));
        assert!(entry.contains(",,,"));
        assert!(exit.contains("Exit long"));
        assert!(exit.contains("Yes"));
    }

    #[test]
    fn open_trade_is_tagged_open_and_uses_now_for_holding_days() {
        let trade = ConsolidatedTrade {
            symbol: "TCS".to_string(),
            entry_time: ts(0),
            exit_time: None,
            entry_price: 100.0,
            exit_price: None,
            qty: 5.0,
            net_pnl_abs: None,
            net_pnl_pct: None,
            holding_bars: 0,
            holding_days: 0.0,
            max_favorable_excursion: 10.0,
            max_adverse_excursion: -5.0,
            snapshot: IndicatorSnapshot::default(),
            close_reason: None,
            price_violation: None,
        };
        let [_, exit] = consolidated_trade_rows(2, &trade, ts(30));
        assert!(exit.contains("OPEN"));
    }
}
