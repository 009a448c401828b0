//! chakra-portfolio
//!
//! Combines several symbols' independent backtest runs into one portfolio
//! view (spec §4.6): a canonical chronological merge of every trade event,
//! FIFO entry/exit pairing into `ConsolidatedTrade`s, and either an
//! isolated-capital sum or a shared-capital pool replay depending on
//! `CapitalMode`.

mod aggregator;
mod consolidate;
mod ledger;
mod ordering;
mod types;

pub use aggregator::{aggregate_portfolio, PortfolioReport};
pub use consolidate::{consolidate, consolidate_all, validate_trade_prices};
pub use ledger::{DroppedEntry, Ledger};
pub use ordering::{merge_canonical, sort_canonical, timestamps_are_sorted, TaggedEvent};
pub use types::{CapitalMode, PortfolioError, SymbolRun};
