pub mod alert_ledger;
pub mod candle_source;
pub mod scan_cycle;
pub mod state_store;
pub mod telegram;
pub mod trading_hours;

pub use alert_ledger::AlertLedger;
pub use candle_source::{fetch_multiple, CandleSource, YahooClient, YahooError};
pub use scan_cycle::{run_scan, run_scan_at, send_end_of_day_recap, send_morning_recap, ScanContext};
pub use state_store::SymbolStateStore;
pub use telegram::{send_all_alerts, Notifier, TelegramClient};
pub use trading_hours::{format_wib, now_local, today_local, TradingHours};
