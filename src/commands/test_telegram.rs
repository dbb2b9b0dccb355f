use crate::models::ScannerConfig;
use crate::services::{format_wib, now_local, Notifier};

use super::{build_clients, fail};

pub async fn run(config: ScannerConfig) {
    println!("📨 Testing Telegram connection");

    if !config.telegram_configured() {
        fail("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must both be set");
    }

    let (_, notifier) = build_clients(&config).unwrap_or_else(|e| fail(e));
    let message = format!(
        "✅ <b>IHSG Scanner test message</b>\n⏰ {}\n\nTelegram is configured correctly.",
        format_wib(now_local())
    );

    if notifier.send(&message).await {
        println!("✅ Test message sent. Check your Telegram chat.");
    } else {
        fail("Test message failed. Check the bot token and chat id.");
    }
}
