/// Errors surfaced by the strategy framework itself (as opposed to the
/// per-bar `StrategyError` the engine wraps an unhandled panic in — that
/// one lives in `chakra-backtest`, since only the engine knows how to
/// catch a strategy callback unwinding).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StrategyError {
    /// `binder.register` called twice with the same key (spec §4.3:
    /// "binding must occur exactly once per indicator; re-binding is an
    /// error").
    DuplicateBinding(String),
    /// The registry has no constructor for this key.
    UnknownStrategy(String),
    /// `--params` JSON failed to deserialize into the strategy's parameter
    /// struct.
    InvalidParams(String),
}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateBinding(key) => write!(f, "indicator '{key}' already bound"),
            Self::UnknownStrategy(key) => write!(f, "no strategy registered under key '{key}'"),
            Self::InvalidParams(msg) => write!(f, "invalid strategy params: {msg}"),
        }
    }
}

impl std::error::Error for StrategyError {}
