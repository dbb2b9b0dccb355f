use crate::models::{ScanSummary, ScannerConfig};
use crate::services::{run_scan, ScanContext};

use super::{build_clients, fail};

pub async fn run(config: ScannerConfig, force: bool) {
    println!("🔍 Running IHSG Supertrend scan{}", if force { " (forced)" } else { "" });

    let (source, notifier) = build_clients(&config).unwrap_or_else(|e| fail(e));
    if !notifier.is_configured() {
        println!("⚠️  Telegram not configured, alerts will only be logged");
    }

    let mut ctx = ScanContext::load(&config);
    let summary = run_scan(&mut ctx, &source, &notifier, &config, force).await;
    print_summary(&summary);

    if let Some(e) = summary.error {
        fail(e);
    }
}

fn print_summary(summary: &ScanSummary) {
    if summary.skipped {
        println!("⏸️  Skipped: {}", summary.reason.as_deref().unwrap_or("-"));
        println!("💡 Tip: use --force to scan outside trading hours");
        return;
    }
    if summary.error.is_some() {
        return;
    }

    println!("✅ Scan complete at {}", summary.timestamp);
    println!("   📈 Stocks scanned:   {}", summary.stocks_scanned);
    println!("   🟢 Bullish breaks:   {}", summary.bullish_breaks);
    println!("   🔴 Bearish breaks:   {}", summary.bearish_breaks);
    println!("   📊 Stoch crossovers: {}", summary.stoch_crossovers);
    println!("   🔵 Accumulations:    {}", summary.accumulations);
    println!("   🎯 Early entries:    {}", summary.early_entries);
    println!("   📨 Messages sent:    {}", summary.messages_sent);
}
