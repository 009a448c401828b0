use chakra_schemas::{EquityPoint, TradeEvent};

/// One symbol's raw backtest output, as handed to the aggregator (spec
/// §4.6 input: "map {symbol -> (trade events, per-bar equity)}").
#[derive(Clone, Debug)]
pub struct SymbolRun {
    pub symbol: String,
    pub trades: Vec<TradeEvent>,
    pub equity: Vec<EquityPoint>,
}

/// How the portfolio aggregator treats capital across symbols (spec §4.6
/// Open Question). `Isolated` is the default: each symbol ran its own
/// engine against its own slice of capital and the portfolio curve is
/// just the sum, no reallocation. `Shared` replays every symbol's fills
/// against one pooled cash balance, dropping (and flagging) any entry the
/// pool can't afford at the time it fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapitalMode {
    Isolated,
    Shared,
}

impl Default for CapitalMode {
    fn default() -> Self {
        CapitalMode::Isolated
    }
}

/// Failure modes for `aggregate_portfolio` (spec §7).
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// `Shared` mode needs an explicit starting cash balance for the pool.
    MissingSharedCapital,
    /// No symbols were supplied at all.
    EmptyInput,
}

impl std::fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSharedCapital => write!(f, "shared capital mode requires an initial_capital"),
            Self::EmptyInput => write!(f, "no symbol runs supplied to the portfolio aggregator"),
        }
    }
}

impl std::error::Error for PortfolioError {}
