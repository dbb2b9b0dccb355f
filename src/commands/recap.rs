use crate::models::ScannerConfig;
use crate::services::{send_end_of_day_recap, ScanContext};
use chrono::Utc;

use super::{build_clients, fail};

pub async fn run(config: ScannerConfig) {
    println!("📋 Sending end-of-day recap");

    let (_, notifier) = build_clients(&config).unwrap_or_else(|e| fail(e));
    let mut ctx = ScanContext::load(&config);

    if send_end_of_day_recap(&mut ctx, &notifier, Utc::now()).await {
        println!("✅ Recap sent");
    } else {
        println!("⚠️  No recap sent (no alerts today or delivery failed)");
    }
}
