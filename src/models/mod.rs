mod ohlcv;
mod scan_result;
mod scanner_config;
mod symbol_state;
mod ticker_group;

pub use ohlcv::Ohlcv;
pub use scan_result::{strip_exchange_suffix, ScanResult, SignalKind, Status};
pub use scanner_config::{BarInterval, ScanSummary, ScannerConfig};
pub use symbol_state::SymbolState;
pub use ticker_group::{TickerGroups, IDX_SUFFIX};

use std::collections::BTreeMap;

/// Candle series keyed by ticker
pub type MarketData = BTreeMap<String, Vec<Ohlcv>>;
