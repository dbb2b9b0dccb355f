use crate::models::ScannerConfig;
use crate::services::send_morning_recap;
use chrono::Utc;

use super::{build_clients, fail};

pub async fn run(config: ScannerConfig) {
    println!("🌅 Building morning recap from current market state");

    let (source, notifier) = build_clients(&config).unwrap_or_else(|e| fail(e));

    if send_morning_recap(&source, &notifier, &config, Utc::now()).await {
        println!("✅ Morning recap sent");
    } else {
        fail("Morning recap was not sent");
    }
}
