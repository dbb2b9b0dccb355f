use crate::models::ScannerConfig;
use crate::services::ScanContext;
use crate::worker;

use super::{build_clients, fail};

pub async fn run(config: ScannerConfig) {
    println!("🚀 Starting IHSG scanner (every {} minutes)", config.scan_interval_minutes);
    println!("📁 State directory: {}", config.state_dir.display());
    if let Some(at) = config.morning_recap_at {
        println!("🌅 Morning recap at {} WIB", at.format("%H:%M"));
    }
    println!("Press Ctrl+C to stop\n");

    let (source, notifier) = build_clients(&config).unwrap_or_else(|e| fail(e));
    let ctx = ScanContext::load(&config);

    worker::run_scan_worker(ctx, &source, &notifier, &config).await;
    println!("👋 Scanner stopped");
}
