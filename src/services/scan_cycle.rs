//! One scan cycle: fetch, analyze, dedup against today's ledger, alert,
//! persist. The caller owns the [`ScanContext`] and must never run two
//! cycles on it at once.

use crate::analysis::{filter_all_current_signals, filter_signals, has_any_signal, scan_all_stocks, SignalMap};
use crate::models::{ScanSummary, ScannerConfig, SignalKind, TickerGroups};
use crate::services::alert_ledger::AlertLedger;
use crate::services::candle_source::{fetch_multiple, CandleSource};
use crate::services::state_store::SymbolStateStore;
use crate::services::telegram::{
    format_daily_recap_message, format_morning_recap_message, send_all_alerts, Notifier,
};
use crate::services::trading_hours::{format_wib, TradingHours};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Mutable state threaded through consecutive scan cycles
pub struct ScanContext {
    pub states: SymbolStateStore,
    pub ledger: AlertLedger,
    pub ledger_path: PathBuf,
    pub trading_hours: TradingHours,
}

impl ScanContext {
    /// Load persisted state from the configured directory
    pub fn load(config: &ScannerConfig) -> Self {
        Self::load_at(config, Utc::now())
    }

    pub fn load_at(config: &ScannerConfig, now: DateTime<Utc>) -> Self {
        let trading_hours = TradingHours::default();
        let ledger_path = config.daily_alerts_file();
        let ledger = AlertLedger::load(&ledger_path, trading_hours.local_date(now));

        Self {
            states: SymbolStateStore::load(&config.state_file()),
            ledger,
            ledger_path,
            trading_hours,
        }
    }

    /// Active ledger, rolled over to today
    pub fn daily_summary(&mut self, now: DateTime<Utc>) -> &AlertLedger {
        if self.ledger.roll_over(self.trading_hours.local_date(now)) {
            self.save_ledger();
        }
        &self.ledger
    }

    fn save_ledger(&self) {
        if let Err(e) = self.ledger.save(&self.ledger_path) {
            error!("Error saving daily alerts: {}", e);
        }
    }
}

/// Run one scan cycle now
pub async fn run_scan<S, N>(
    ctx: &mut ScanContext,
    source: &S,
    notifier: &N,
    config: &ScannerConfig,
    force: bool,
) -> ScanSummary
where
    S: CandleSource + ?Sized,
    N: Notifier + ?Sized,
{
    run_scan_at(ctx, source, notifier, config, force, Utc::now()).await
}

/// Run one scan cycle as of `now`
///
/// Outside trading hours the cycle is skipped unless `force` is set. Only
/// signal types whose message was delivered get recorded in the ledger, so a
/// failed send is retried on the next cycle.
pub async fn run_scan_at<S, N>(
    ctx: &mut ScanContext,
    source: &S,
    notifier: &N,
    config: &ScannerConfig,
    force: bool,
    now: DateTime<Utc>,
) -> ScanSummary
where
    S: CandleSource + ?Sized,
    N: Notifier + ?Sized,
{
    if !force && !ctx.trading_hours.is_open_at(now) {
        info!("Outside trading hours. Skipping scan.");
        return ScanSummary::skipped("Outside trading hours");
    }

    info!("Starting IHSG Supertrend scan");

    let universe = match TickerGroups::load(config.universe_file.as_deref()) {
        Ok(universe) => universe,
        Err(e) => {
            error!("Failed to load stock universe: {}", e);
            return ScanSummary::failed(e.to_string());
        }
    };
    let tickers = universe.all_tickers();
    info!("Scanning {} stocks...", tickers.len());

    let stock_data = fetch_multiple(
        source,
        &tickers,
        &config.data_period,
        config.interval,
        config.fetch_delay,
    )
    .await;

    if stock_data.is_empty() {
        error!("No data fetched. Aborting scan.");
        return ScanSummary::failed("No data fetched");
    }

    let local_now = now.with_timezone(&ctx.trading_hours.tz());
    let today = local_now.date_naive();
    if ctx.ledger.roll_over(today) {
        ctx.save_ledger();
    }

    info!("Analyzing stocks...");
    let results = scan_all_stocks(&stock_data);
    let all_signals = filter_signals(results.values());

    let mut new_signals = SignalMap::new();
    for (kind, list) in all_signals {
        let fresh: Vec<_> = list
            .iter()
            .filter(|r| !ctx.ledger.is_already_alerted(kind, &r.ticker, today))
            .cloned()
            .collect();
        if !list.is_empty() {
            info!(signal = %kind, total = list.len(), new = fresh.len(), "Signals found");
        }
        new_signals.insert(kind, fresh);
    }

    let mut messages_sent = 0;
    if has_any_signal(&new_signals) {
        info!("Sending alerts for new signals...");
        let delivered = send_all_alerts(notifier, &new_signals, &format_wib(local_now)).await;
        messages_sent = delivered.len();
        info!("Sent {} alert messages", messages_sent);

        for kind in &delivered {
            for result in new_signals.get(kind).into_iter().flatten() {
                ctx.ledger.add_alerted(*kind, &result.ticker);
            }
        }
        ctx.save_ledger();
    } else {
        info!("No new signals detected this scan");
    }

    info!("Updating stock states...");
    let updated_at = local_now.to_rfc3339();
    for result in results.values() {
        ctx.states.update_from_scan_result(result, &updated_at);
    }
    if let Err(e) = ctx.states.save() {
        error!("Error saving states: {}", e);
    }

    let count = |kind: SignalKind| new_signals.get(&kind).map_or(0, Vec::len);
    let summary = ScanSummary {
        stocks_scanned: stock_data.len(),
        bullish_breaks: count(SignalKind::BullishBreak),
        bearish_breaks: count(SignalKind::BearishBreak),
        stoch_crossovers: count(SignalKind::StochCrossover),
        accumulations: count(SignalKind::Accumulation),
        early_entries: count(SignalKind::EarlyEntry),
        messages_sent,
        timestamp: updated_at,
        ..ScanSummary::default()
    };

    info!(
        stocks = summary.stocks_scanned,
        signals = summary.total_signals(),
        messages = summary.messages_sent,
        "Scan complete"
    );
    summary
}

/// Send the end-of-day recap of everything alerted today
///
/// # Returns
/// * false when there was nothing to send or delivery failed
pub async fn send_end_of_day_recap<N: Notifier + ?Sized>(
    ctx: &mut ScanContext,
    notifier: &N,
    now: DateTime<Utc>,
) -> bool {
    let timestamp = format_wib(now.with_timezone(&ctx.trading_hours.tz()));
    let ledger = ctx.daily_summary(now);

    if ledger.is_empty() {
        info!("No signals detected today. No recap to send.");
        return false;
    }

    info!("Sending recap with {} total signals...", ledger.total());
    let message = format_daily_recap_message(ledger, &timestamp);
    notifier.send(&message).await
}

/// Fetch the universe and send the current-state morning recap
///
/// Does not touch the ledger or the symbol states.
pub async fn send_morning_recap<S, N>(
    source: &S,
    notifier: &N,
    config: &ScannerConfig,
    now: DateTime<Utc>,
) -> bool
where
    S: CandleSource + ?Sized,
    N: Notifier + ?Sized,
{
    let universe = match TickerGroups::load(config.universe_file.as_deref()) {
        Ok(universe) => universe,
        Err(e) => {
            error!("Failed to load stock universe: {}", e);
            return false;
        }
    };

    let stock_data = fetch_multiple(
        source,
        &universe.all_tickers(),
        &config.data_period,
        config.interval,
        config.fetch_delay,
    )
    .await;

    if stock_data.is_empty() {
        warn!("No data fetched. Morning recap skipped.");
        return false;
    }

    let results = scan_all_stocks(&stock_data);
    let categories = filter_all_current_signals(results.values());
    let timestamp = format_wib(now.with_timezone(&TradingHours::default().tz()));
    notifier
        .send(&format_morning_recap_message(&categories, &timestamp))
        .await
}
