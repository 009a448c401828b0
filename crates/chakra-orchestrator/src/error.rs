/// Failure modes surfaced by the orchestrator (spec §7, §6 exit codes).
/// The CLI maps these to process exit codes: `Config` -> 1, `AllSymbolsFailed`
/// -> 2, everything else the CLI itself catches becomes 3.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Bad flags, an unknown strategy key, malformed `--params`, or a
    /// basket file that couldn't be read.
    Config(String),
    /// Every symbol in the basket failed to produce a backtest report.
    AllSymbolsFailed(Vec<(String, String)>),
    /// The portfolio aggregation step itself failed (e.g. empty basket
    /// after filtering out failures).
    Portfolio(String),
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::AllSymbolsFailed(failures) => {
                write!(f, "all {} symbols failed:", failures.len())?;
                for (symbol, reason) in failures {
                    write!(f, " [{symbol}: {reason}]")?;
                }
                Ok(())
            }
            Self::Portfolio(msg) => write!(f, "portfolio aggregation failed: {msg}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}
