use chakra_integrity::ValidationReport;
use chakra_schemas::{DataFingerprint, EquityPoint, TradeEvent};

/// Process-wide, immutable-per-run broker configuration (spec §3
/// `BrokerConfig`). The engine takes it by value at construction and never
/// mutates it.
pub type BacktestConfig = chakra_schemas::BrokerConfig;

/// Unrecoverable conditions for a single symbol's run (spec §7
/// `EngineError`/`StrategyError`). Recoverable conditions — a dropped
/// order for insufficient cash, a skipped NaN bar — are not errors; they
/// are recorded in `BacktestReport::warnings` and the run continues.
#[derive(Debug)]
pub enum BacktestError {
    /// An engine invariant was violated (e.g. cash went negative by more
    /// than a single commission-rounding epsilon after a fill).
    InvariantViolation(String),
    /// The strategy callback panicked; the orchestrator records the
    /// symbol as failed and continues with the others (spec §4.4.3).
    StrategyPanic(String),
    /// `BrokerConfig::validate` rejected the configuration.
    InvalidConfig(String),
}

impl std::fmt::Display for BacktestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvariantViolation(msg) => write!(f, "engine invariant violated: {msg}"),
            Self::StrategyPanic(msg) => write!(f, "strategy panicked: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid broker config: {msg}"),
        }
    }
}

impl std::error::Error for BacktestError {}

/// Public result of `BacktestEngine::run` (spec §4.4.4).
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub symbol: String,
    pub trades: Vec<TradeEvent>,
    pub equity: Vec<EquityPoint>,
    pub data_fingerprint: DataFingerprint,
    pub validation: ValidationReport,
    /// Recoverable-condition messages: dropped orders, skipped NaN bars,
    /// validation warnings carried forward.
    pub warnings: Vec<String>,
}
