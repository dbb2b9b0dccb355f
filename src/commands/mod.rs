pub mod morning;
pub mod recap;
pub mod run;
pub mod scan;
pub mod status;
pub mod test_telegram;

use crate::error::Result;
use crate::models::ScannerConfig;
use crate::services::{TelegramClient, YahooClient};

/// Build the live candle source and notifier from config
pub(crate) fn build_clients(config: &ScannerConfig) -> Result<(YahooClient, TelegramClient)> {
    let source = YahooClient::new(config.fetch_timeout)?;
    let notifier = TelegramClient::from_config(config)?;
    Ok((source, notifier))
}

/// Print an error and exit with status 1
pub(crate) fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("❌ Error: {}", e);
    std::process::exit(1);
}
