use crate::models::ScannerConfig;
use crate::services::telegram::format_startup_message;
use crate::services::{
    format_wib, run_scan, run_scan_at, send_end_of_day_recap, send_morning_recap, CandleSource,
    Notifier, ScanContext,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

pub const STOP_MESSAGE: &str = "🛑 IHSG Scanner stopped";

/// Once-per-day bookkeeping for the recaps
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecapTracker {
    last_closing_recap: Option<NaiveDate>,
    last_morning_recap: Option<NaiveDate>,
}

impl RecapTracker {
    /// Closing recap is due once per trading day anywhere in the closing
    /// window, including ticks that land after the session has ended
    pub fn closing_recap_due(&self, ctx: &ScanContext, now: DateTime<Utc>) -> bool {
        let hours = &ctx.trading_hours;
        hours.is_trading_day(now)
            && hours.is_closing_at(now)
            && self.last_closing_recap != Some(hours.local_date(now))
    }

    pub fn mark_closing_recap(&mut self, date: NaiveDate) {
        self.last_closing_recap = Some(date);
    }

    /// Morning recap is due once per trading day at or after `at`, before the open
    pub fn morning_recap_due(&self, ctx: &ScanContext, at: NaiveTime, now: DateTime<Utc>) -> bool {
        let hours = &ctx.trading_hours;
        if !hours.is_trading_day(now) || hours.is_open_at(now) {
            return false;
        }
        let local = now.with_timezone(&hours.tz());
        let open = NaiveTime::from_hms_opt(hours.start_hour, hours.start_minute, 0)
            .unwrap_or(NaiveTime::MIN);
        local.time() >= at
            && local.time() < open
            && self.last_morning_recap != Some(local.date_naive())
    }

    pub fn mark_morning_recap(&mut self, date: NaiveDate) {
        self.last_morning_recap = Some(date);
    }
}

/// Time left until the next multiple of `interval_minutes` past the hour
pub fn delay_until_next_tick(now: DateTime<Utc>, interval_minutes: u32) -> Duration {
    let step = u64::from(interval_minutes.max(1)) * 60;
    let elapsed = now.timestamp().rem_euclid(step as i64) as u64;
    let wait = step - elapsed;
    Duration::from_secs(wait).saturating_sub(Duration::from_nanos(u64::from(now.timestamp_subsec_nanos())))
}

/// Run the scheduler until Ctrl-C
///
/// Sends the startup message and one forced scan, then wakes on every
/// interval boundary. A failed cycle is reported to the chat and the loop
/// keeps going.
#[instrument(skip(ctx, source, notifier, config))]
pub async fn run<S, N>(mut ctx: ScanContext, source: &S, notifier: &N, config: &ScannerConfig)
where
    S: CandleSource + ?Sized,
    N: Notifier + ?Sized,
{
    info!(
        interval_minutes = config.scan_interval_minutes,
        morning_recap = ?config.morning_recap_at,
        "Starting scan worker"
    );

    tokio::select! {
        _ = schedule(&mut ctx, source, notifier, config) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Scan worker: Failed to listen for shutdown signal");
            }
            info!("Scan worker: Shutdown requested");
        }
    }

    notifier.send(STOP_MESSAGE).await;
    info!("Scan worker stopped");
}

async fn schedule<S, N>(ctx: &mut ScanContext, source: &S, notifier: &N, config: &ScannerConfig)
where
    S: CandleSource + ?Sized,
    N: Notifier + ?Sized,
{
    let startup = format_startup_message(
        config.scan_interval_minutes,
        &format_wib(Utc::now().with_timezone(&ctx.trading_hours.tz())),
    );
    if !notifier.send(&startup).await {
        warn!("Scan worker: Startup message not delivered");
    }

    info!("Scan worker: Running initial scan");
    let summary = run_scan(ctx, source, notifier, config, true).await;
    report_failure(notifier, summary.error.as_deref(), 0).await;

    let mut recaps = RecapTracker::default();
    let mut iteration_count = 0u64;

    loop {
        sleep(delay_until_next_tick(Utc::now(), config.scan_interval_minutes)).await;

        iteration_count += 1;
        let loop_start = std::time::Instant::now();
        let now = Utc::now();
        let today = ctx.trading_hours.local_date(now);

        if let Some(at) = config.morning_recap_at {
            if recaps.morning_recap_due(ctx, at, now) {
                info!(iteration = iteration_count, "Scan worker: Sending morning recap");
                send_morning_recap(source, notifier, config, now).await;
                recaps.mark_morning_recap(today);
            }
        }

        if recaps.closing_recap_due(ctx, now) {
            info!(iteration = iteration_count, "Scan worker: Sending end-of-day recap");
            send_end_of_day_recap(ctx, notifier, now).await;
            recaps.mark_closing_recap(today);
            continue;
        }

        let is_trading = ctx.trading_hours.is_open_at(now);
        info!(
            iteration = iteration_count,
            is_trading_hours = is_trading,
            "Scan worker: Tick"
        );

        if !is_trading {
            continue;
        }

        let summary = run_scan_at(ctx, source, notifier, config, false, now).await;
        report_failure(notifier, summary.error.as_deref(), iteration_count).await;

        info!(
            iteration = iteration_count,
            stocks = summary.stocks_scanned,
            signals = summary.total_signals(),
            loop_duration_ms = loop_start.elapsed().as_millis() as u64,
            "Scan worker: Cycle finished"
        );
    }
}

async fn report_failure<N: Notifier + ?Sized>(notifier: &N, error: Option<&str>, iteration: u64) {
    if let Some(e) = error {
        error!(iteration = iteration, error = %e, "Scan worker: Scan failed");
        notifier.send(&format!("⚠️ Scanner Error: {}", e)).await;
    }
}
