use crate::models::{ScannerConfig, SignalKind, TickerGroups};
use crate::services::{today_local, AlertLedger, SymbolStateStore};

pub fn run(config: ScannerConfig) {
    println!("📊 Scanner Status\n");

    match TickerGroups::load(config.universe_file.as_deref()) {
        Ok(universe) => println!(
            "🌐 Universe: {} tickers in {} groups",
            universe.ticker_count(),
            universe.group_count()
        ),
        Err(e) => eprintln!("⚠️  Could not load universe: {}", e),
    }
    println!(
        "📨 Telegram: {}",
        if config.telegram_configured() { "configured" } else { "not configured" }
    );

    println!("\n═══════════════════════════════════════════════════════════\n");
    show_states(&config);
    println!("\n═══════════════════════════════════════════════════════════\n");
    show_ledger(&config);
}

fn show_states(config: &ScannerConfig) {
    let store = SymbolStateStore::load(&config.state_file());
    if store.is_empty() {
        println!("⚠️  No symbol states yet. Run 'scan --force' first.");
        return;
    }

    let bullish = store.all().values().filter(|s| s.is_bullish).count();
    println!(
        "📈 Tracked symbols: {} ({} bullish, {} bearish)",
        store.len(),
        bullish,
        store.len() - bullish
    );

    let mut ranked: Vec<_> = store.all().iter().collect();
    ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score).then_with(|| a.0.cmp(b.0)));
    println!("\n🏆 Top scores:");
    for (ticker, state) in ranked.iter().take(10) {
        println!(
            "   {} {:<10} {:>3}  {}",
            state.status.emoji(),
            ticker,
            state.score,
            state.status
        );
    }
}

fn show_ledger(config: &ScannerConfig) {
    let today = today_local();
    let ledger = AlertLedger::load(&config.daily_alerts_file(), today);
    println!("🗓️  Alerts for {}: {}", today, ledger.total());

    for kind in SignalKind::ALL {
        let tickers = ledger.tickers(kind);
        if !tickers.is_empty() {
            println!("   {:<16} {}", kind.as_str(), tickers.join(", "));
        }
    }
}
