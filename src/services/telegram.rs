//! Telegram delivery and alert message formatting
//!
//! Messages use Telegram's HTML parse mode. Every formatter takes the
//! display timestamp so output is reproducible.

use crate::analysis::{CurrentSignals, SignalMap};
use crate::constants::EARLY_ENTRY_CONDITIONS;
use crate::error::{AppError, Result};
use crate::models::{strip_exchange_suffix, ScanResult, ScannerConfig, SignalKind};
use crate::services::alert_ledger::AlertLedger;
use crate::utils::{format_change, format_thousands};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{error, info, warn};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// A channel that accepts pre-formatted messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message; false on any failure
    async fn send(&self, text: &str) -> bool;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Telegram Bot API client
///
/// Without credentials every message is logged and counted as delivered,
/// so a local run behaves like a dry run.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl TelegramClient {
    /// # Arguments
    /// * `token` / `chat_id` - Bot credentials; both must be present to send
    /// * `timeout` - Per-message request timeout
    pub fn new(token: Option<String>, chat_id: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let credentials = match (token, chat_id) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            credentials,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        Self::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
            config.send_timeout,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn post_message(&self, token: &str, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, token);
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        Err(AppError::Notification(format!("Telegram error: {} - {}", status, body)))
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> bool {
        let (token, chat_id) = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                warn!("Telegram not configured. Message would be:\n{}", text);
                return true;
            }
        };

        match self.post_message(token, chat_id, text).await {
            Ok(()) => {
                info!("Telegram message sent successfully");
                true
            }
            Err(e) => {
                error!("Error sending Telegram message: {}", e);
                false
            }
        }
    }
}

fn header(lines: &mut Vec<String>, title: &str, timestamp: &str) {
    lines.push(RULE.to_string());
    lines.push(title.to_string());
    lines.push(RULE.to_string());
    lines.push(format!("⏰ {}", timestamp));
    lines.push(String::new());
}

fn price_line(emoji: &str, r: &ScanResult, change: String) -> String {
    format!(
        "{} <b>{}</b> | {} ({})",
        emoji,
        r.display_ticker(),
        format_thousands(r.price),
        change
    )
}

fn join_tickers<'a, I: IntoIterator<Item = &'a str>>(tickers: I) -> String {
    tickers
        .into_iter()
        .map(strip_exchange_suffix)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_bullish_break_message(results: &[ScanResult], timestamp: &str) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();
    header(&mut lines, "🟢 <b>SUPERTREND BULLISH BREAK</b>", timestamp);

    for r in results {
        lines.push(price_line("📈", r, format_change(r.change_percent)));
        lines.push(format!(
            "   └─ ST: {} | Score: {}",
            format_thousands(r.supertrend_value),
            r.score
        ));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!("Total: {} saham break bullish", results.len()));
    lines.join("\n")
}

pub fn format_bearish_break_message(results: &[ScanResult], timestamp: &str) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();
    header(&mut lines, "🔴 <b>SUPERTREND BEARISH BREAK</b>", timestamp);

    for r in results {
        lines.push(price_line("📉", r, format!("{:.1}%", r.change_percent)));
        lines.push(format!(
            "   └─ ST: {} | Score: {}",
            format_thousands(r.supertrend_value),
            r.score
        ));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!("Total: {} saham break bearish", results.len()));
    lines.join("\n")
}

/// Sorted by %K ascending, so names coming out of oversold lead
pub fn format_stoch_crossover_message(results: &[ScanResult], timestamp: &str) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&ScanResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.stoch_k.total_cmp(&b.stoch_k));

    let mut lines = Vec::new();
    header(&mut lines, "📈 <b>STOCH RSI CROSSOVER</b>", timestamp);

    for r in sorted {
        lines.push(price_line("📊", r, format_change(r.change_percent)));
        lines.push(format!("   └─ Stoch K: {:.0} ↗ D: {:.0}", r.stoch_k, r.stoch_d));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("💡 <i>K crossed above D = bullish momentum!</i>".to_string());
    lines.push(format!("Total: {} saham stoch crossover", results.len()));
    lines.join("\n")
}

pub fn format_accumulation_message(results: &[ScanResult], timestamp: &str) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();
    header(&mut lines, "🔵 <b>ACCUMULATION SIGNAL</b>", timestamp);

    for r in results {
        lines.push(price_line("📊", r, format_change(r.change_percent)));
        lines.push(format!(
            "   └─ Score: {} | Vol: {:.1}x | Stoch: {:.0}",
            r.score, r.volume_ratio, r.stoch_k
        ));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!("Total: {} saham accumulation", results.len()));
    lines.join("\n")
}

fn strength_emoji(strength: u8) -> &'static str {
    if strength >= 5 {
        "🔥"
    } else if strength >= 3 {
        "💎"
    } else {
        "📍"
    }
}

/// Sorted by strength, strongest first
pub fn format_early_entry_message(results: &[ScanResult], timestamp: &str) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&ScanResult> = results.iter().collect();
    sorted.sort_by(|a, b| b.early_entry_strength.cmp(&a.early_entry_strength));

    let mut lines = Vec::new();
    header(&mut lines, "🎯 <b>EARLY ENTRY (SEROK BAWAH)</b>", timestamp);

    for r in sorted {
        let strength = r.early_entry_strength;
        lines.push(price_line(strength_emoji(strength), r, format_change(r.change_percent)));
        lines.push(format!(
            "   └─ Koreksi: {:.1}% | Strength: {}/{}",
            r.correction_percent, strength, EARLY_ENTRY_CONDITIONS
        ));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("⚠️ <i>Sinyal dini - DYOR!</i>".to_string());
    lines.push(format!("Total: {} saham early entry", results.len()));
    lines.join("\n")
}

/// Formatted alert for one signal type
pub fn format_signal_message(kind: SignalKind, results: &[ScanResult], timestamp: &str) -> String {
    match kind {
        SignalKind::BullishBreak => format_bullish_break_message(results, timestamp),
        SignalKind::BearishBreak => format_bearish_break_message(results, timestamp),
        SignalKind::StochCrossover => format_stoch_crossover_message(results, timestamp),
        SignalKind::Accumulation => format_accumulation_message(results, timestamp),
        SignalKind::EarlyEntry => format_early_entry_message(results, timestamp),
    }
}

pub fn format_startup_message(scan_interval_minutes: u32, timestamp: &str) -> String {
    [
        RULE.to_string(),
        "🤖 <b>IHSG SCANNER STARTED</b>".to_string(),
        RULE.to_string(),
        format!("⏰ {}", timestamp),
        String::new(),
        "Scanner is now running.".to_string(),
        format!("Alerts will be sent every {} minutes.", scan_interval_minutes),
        RULE.to_string(),
    ]
    .join("\n")
}

fn recap_label(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::BullishBreak => "🟢 <b>BULLISH BREAK</b>",
        SignalKind::BearishBreak => "🔴 <b>BEARISH BREAK</b>",
        SignalKind::StochCrossover => "📈 <b>STOCH CROSSOVER</b>",
        SignalKind::Accumulation => "🔵 <b>ACCUMULATION</b>",
        SignalKind::EarlyEntry => "🎯 <b>EARLY ENTRY</b>",
    }
}

/// End-of-day recap listing everything alerted today
pub fn format_daily_recap_message(ledger: &AlertLedger, timestamp: &str) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "📋 <b>REKAP HARIAN - END OF DAY</b>".to_string(),
        RULE.to_string(),
        format!("📅 {}", ledger.date.format("%Y-%m-%d")),
        format!("⏰ {}", timestamp),
        String::new(),
    ];

    for kind in SignalKind::ALL {
        let tickers = ledger.tickers(kind);
        if tickers.is_empty() {
            continue;
        }
        lines.push(format!("{} ({} saham)", recap_label(kind), tickers.len()));
        lines.push(format!("   {}", join_tickers(tickers.iter().map(String::as_str))));
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.push(format!("📊 Total: {} sinyal hari ini", ledger.total()));
    lines.push(RULE.to_string());
    lines.join("\n")
}

fn push_detailed(
    lines: &mut Vec<String>,
    title: &str,
    results: &[ScanResult],
    limit: usize,
    detail: impl Fn(&ScanResult) -> String,
) {
    if results.is_empty() {
        return;
    }
    lines.push(format!("{} ({} saham)", title, results.len()));
    for r in results.iter().take(limit) {
        lines.push(format!(
            "   • {} | {} | {}",
            r.display_ticker(),
            format_thousands(r.price),
            detail(r)
        ));
    }
    if results.len() > limit {
        lines.push(format!("   ... dan {} lainnya", results.len() - limit));
    }
    lines.push(String::new());
}

fn push_compact(lines: &mut Vec<String>, title: &str, results: &[ScanResult], limit: usize, show_more: bool) {
    if results.is_empty() {
        return;
    }
    lines.push(format!("{} ({} saham)", title, results.len()));
    lines.push(format!(
        "   {}",
        join_tickers(results.iter().take(limit).map(|r| r.ticker.as_str()))
    ));
    if show_more && results.len() > limit {
        lines.push(format!("   ... dan {} lainnya", results.len() - limit));
    }
    lines.push(String::new());
}

/// Pre-market recap of everything currently in a favourable state
pub fn format_morning_recap_message(signals: &CurrentSignals, timestamp: &str) -> String {
    let mut lines = Vec::new();
    header(&mut lines, "☀️ <b>MORNING SCAN</b>", timestamp);

    push_detailed(&mut lines, "🔥 <b>STRONG BUY</b>", &signals.strong_buy, 10, |r| {
        format!("Score: {}", r.score)
    });
    push_detailed(&mut lines, "🔵 <b>ACCUMULATION</b>", &signals.accumulation, 10, |r| {
        format!("Score: {}", r.score)
    });
    push_compact(&mut lines, "🟢 <b>BULLISH</b>", &signals.bullish, 15, true);
    push_detailed(&mut lines, "🎯 <b>EARLY ENTRY</b>", &signals.early_entry, 8, |r| {
        format!("Koreksi: {:.1}%", r.correction_percent)
    });
    push_compact(&mut lines, "📈 <b>STOCH CROSSOVER</b>", &signals.stoch_crossover, 15, true);
    push_compact(&mut lines, "⚠️ <b>BEARISH WATCH</b>", &signals.bearish_watch, 10, false);

    let total = signals.strong_buy.len()
        + signals.accumulation.len()
        + signals.bullish.len()
        + signals.early_entry.len()
        + signals.stoch_crossover.len()
        + signals.bearish_watch.len();

    lines.push(RULE.to_string());
    lines.push(format!("📊 Total: {} saham dalam radar", total));
    lines.push("💡 <i>Scan lengkap sebelum market buka</i>".to_string());
    lines.push(RULE.to_string());
    lines.join("\n")
}

/// Send one message per non-empty signal type
///
/// # Returns
/// * The signal types whose message was delivered
pub async fn send_all_alerts<N: Notifier + ?Sized>(
    notifier: &N,
    signals: &SignalMap,
    timestamp: &str,
) -> BTreeSet<SignalKind> {
    let mut delivered = BTreeSet::new();

    for kind in SignalKind::ALL {
        let results = match signals.get(&kind) {
            Some(results) if !results.is_empty() => results,
            _ => continue,
        };

        let message = format_signal_message(kind, results, timestamp);
        if notifier.send(&message).await {
            delivered.insert(kind);
        } else {
            warn!(signal = %kind, tickers = results.len(), "Alert not delivered");
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::signals::empty_signal_map;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    const TS: &str = "16 Oct 2026, 10:05 WIB";

    /// Records messages; fails any message containing `fail_on`
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> bool {
            if let Some(marker) = self.fail_on {
                if text.contains(marker) {
                    return false;
                }
            }
            self.sent.lock().unwrap().push(text.to_string());
            true
        }
    }

    fn result(ticker: &str, price: f64, change: f64) -> ScanResult {
        ScanResult {
            price,
            change_percent: change,
            supertrend_value: price * 0.9,
            score: 64,
            ..ScanResult::new(ticker)
        }
    }

    #[test]
    fn test_bullish_break_message() {
        let msg = format_bullish_break_message(&[result("BBCA.JK", 9850.0, 1.26)], TS);

        assert!(msg.contains("🟢 <b>SUPERTREND BULLISH BREAK</b>"));
        assert!(msg.contains("⏰ 16 Oct 2026, 10:05 WIB"));
        assert!(msg.contains("📈 <b>BBCA</b> | 9,850 (+1.3%)"));
        assert!(msg.contains("ST: 8,865 | Score: 64"));
        assert!(msg.ends_with("Total: 1 saham break bullish"));
        assert!(format_bullish_break_message(&[], TS).is_empty());
    }

    #[test]
    fn test_stoch_sorted_by_k() {
        let mut high = result("AAAA.JK", 1000.0, 0.0);
        high.stoch_k = 45.0;
        let mut low = result("BBBB.JK", 1000.0, 0.0);
        low.stoch_k = 12.0;

        let msg = format_stoch_crossover_message(&[high, low], TS);
        let a = msg.find("AAAA").unwrap();
        let b = msg.find("BBBB").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_early_entry_sorted_by_strength() {
        let mut weak = result("WEAK.JK", 500.0, -4.0);
        weak.early_entry_strength = 2;
        weak.correction_percent = 4.0;
        let mut strong = result("STRG.JK", 500.0, -8.0);
        strong.early_entry_strength = 6;
        strong.correction_percent = 8.0;

        let msg = format_early_entry_message(&[weak, strong], TS);
        assert!(msg.find("STRG").unwrap() < msg.find("WEAK").unwrap());
        assert!(msg.contains("🔥 <b>STRG</b>"));
        assert!(msg.contains("📍 <b>WEAK</b>"));
        assert!(msg.contains("Koreksi: 8.0% | Strength: 6/7"));
    }

    #[test]
    fn test_daily_recap_lists_ledger() {
        let mut ledger = AlertLedger::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        ledger.add_alerted(SignalKind::BullishBreak, "BBCA.JK");
        ledger.add_alerted(SignalKind::BullishBreak, "TLKM.JK");
        ledger.add_alerted(SignalKind::EarlyEntry, "ANTM.JK");

        let msg = format_daily_recap_message(&ledger, TS);
        assert!(msg.contains("📅 2026-10-16"));
        assert!(msg.contains("🟢 <b>BULLISH BREAK</b> (2 saham)\n   BBCA, TLKM"));
        assert!(msg.contains("🎯 <b>EARLY ENTRY</b> (1 saham)\n   ANTM"));
        assert!(!msg.contains("BEARISH BREAK"));
        assert!(msg.contains("📊 Total: 3 sinyal hari ini"));
    }

    #[test]
    fn test_morning_recap_caps_lists() {
        let mut signals = CurrentSignals::default();
        signals.strong_buy = (0..12)
            .map(|i| result(&format!("S{:03}.JK", i), 1000.0, 0.0))
            .collect();
        signals.bearish_watch = (0..11)
            .map(|i| result(&format!("B{:03}.JK", i), 1000.0, 0.0))
            .collect();

        let msg = format_morning_recap_message(&signals, TS);
        assert!(msg.contains("🔥 <b>STRONG BUY</b> (12 saham)"));
        assert!(msg.contains("S009"));
        assert!(!msg.contains("S010"));
        assert!(msg.contains("... dan 2 lainnya"));
        // Bearish watch is capped without a "more" line
        assert!(!msg.contains("B010"));
        assert!(!msg.contains("... dan 1 lainnya"));
        assert!(msg.contains("📊 Total: 23 saham dalam radar"));
    }

    #[tokio::test]
    async fn test_send_all_alerts_reports_delivered_kinds() {
        let notifier = RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail_on: Some("ACCUMULATION SIGNAL"),
        };
        let mut signals = empty_signal_map();
        signals.insert(SignalKind::BullishBreak, vec![result("BBCA.JK", 9850.0, 1.0)]);
        signals.insert(SignalKind::Accumulation, vec![result("BBRI.JK", 4500.0, 2.0)]);

        let delivered = send_all_alerts(&notifier, &signals, TS).await;

        assert_eq!(delivered.len(), 1);
        assert!(delivered.contains(&SignalKind::BullishBreak));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_client_logs_and_succeeds() {
        let client = TelegramClient::new(None, Some("123".to_string()), Duration::from_secs(1)).unwrap();
        assert!(!client.is_configured());
        assert!(client.send("hello").await);
    }
}
