use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Bar interval requested from the candle source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarInterval {
    /// Daily candles ("1d")
    Daily,
    /// Hourly candles ("1h")
    Hourly,
}

impl BarInterval {
    /// Convert to Yahoo Finance format ("1d", "1h")
    pub fn to_yahoo_format(&self) -> &'static str {
        match self {
            BarInterval::Daily => "1d",
            BarInterval::Hourly => "1h",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "1d" | "daily" => Ok(BarInterval::Daily),
            "1h" | "hourly" => Ok(BarInterval::Hourly),
            _ => Err(format!("Invalid interval: {}. Valid options: 1d, 1h", s)),
        }
    }
}

/// Runtime configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Telegram bot token (None = log messages instead of sending)
    pub telegram_bot_token: Option<String>,

    /// Telegram chat id receiving alerts
    pub telegram_chat_id: Option<String>,

    /// Directory holding stock_states.json and daily_alerts.json
    pub state_dir: PathBuf,

    /// Optional JSON file overriding the built-in universe
    pub universe_file: Option<PathBuf>,

    /// Lookback passed to the candle source (e.g. "120d")
    pub data_period: String,

    /// Candle interval
    pub interval: BarInterval,

    /// Pause between two candle requests
    pub fetch_delay: Duration,

    /// Timeout for one candle request
    pub fetch_timeout: Duration,

    /// Timeout for one notification
    pub send_timeout: Duration,

    /// Scheduler cadence in minutes
    pub scan_interval_minutes: u32,

    /// Local time for the morning recap (None = disabled)
    pub morning_recap_at: Option<NaiveTime>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            state_dir: PathBuf::from("database"),
            universe_file: None,
            data_period: "120d".to_string(),
            interval: BarInterval::Daily,
            fetch_delay: Duration::from_millis(100),
            fetch_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(10),
            scan_interval_minutes: 5,
            morning_recap_at: None,
        }
    }
}

impl ScannerConfig {
    /// Build config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let interval = match non_empty("DATA_INTERVAL") {
            Some(raw) => BarInterval::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("{}; using daily", e);
                BarInterval::Daily
            }),
            None => defaults.interval,
        };

        let scan_interval_minutes = non_empty("SCAN_INTERVAL_MINUTES")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|m| *m > 0 && *m <= 60)
            .unwrap_or(defaults.scan_interval_minutes);

        let fetch_delay = non_empty("FETCH_DELAY_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.fetch_delay);

        let morning_recap_at = non_empty("MORNING_RECAP_AT")
            .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok());

        Self {
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
            state_dir: non_empty("SCANNER_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            universe_file: non_empty("SCANNER_UNIVERSE_FILE").map(PathBuf::from),
            data_period: non_empty("DATA_PERIOD").unwrap_or(defaults.data_period),
            interval,
            fetch_delay,
            fetch_timeout: defaults.fetch_timeout,
            send_timeout: defaults.send_timeout,
            scan_interval_minutes,
            morning_recap_at,
        }
    }

    /// Path of the persisted symbol states
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("stock_states.json")
    }

    /// Path of the persisted daily alert ledger
    pub fn daily_alerts_file(&self) -> PathBuf {
        self.state_dir.join("daily_alerts.json")
    }

    /// True when both Telegram credentials are present
    pub fn telegram_configured(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

/// Per-cycle outcome returned to the scheduler
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stocks_scanned: usize,
    pub bullish_breaks: usize,
    pub bearish_breaks: usize,
    pub stoch_crossovers: usize,
    pub accumulations: usize,
    pub early_entries: usize,
    pub messages_sent: usize,
    pub timestamp: String,
}

impl ScanSummary {
    /// Summary for a cycle that did not run
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Summary for a cycle that aborted
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Total new signals across all types
    pub fn total_signals(&self) -> usize {
        self.bullish_breaks
            + self.bearish_breaks
            + self.stoch_crossovers
            + self.accumulations
            + self.early_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_to_yahoo_format() {
        assert_eq!(BarInterval::Daily.to_yahoo_format(), "1d");
        assert_eq!(BarInterval::Hourly.to_yahoo_format(), "1h");
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!(BarInterval::from_str("1D").unwrap(), BarInterval::Daily);
        assert_eq!(BarInterval::from_str("daily").unwrap(), BarInterval::Daily);
        assert_eq!(BarInterval::from_str("1h").unwrap(), BarInterval::Hourly);
        assert!(BarInterval::from_str("15m").is_err());
    }

    #[test]
    fn test_scanner_config_default() {
        let config = ScannerConfig::default();
        assert_eq!(config.data_period, "120d");
        assert_eq!(config.interval, BarInterval::Daily);
        assert_eq!(config.scan_interval_minutes, 5);
        assert_eq!(config.state_file(), PathBuf::from("database/stock_states.json"));
        assert_eq!(config.daily_alerts_file(), PathBuf::from("database/daily_alerts.json"));
        assert!(!config.telegram_configured());
    }

    #[test]
    fn test_summary_totals() {
        let summary = ScanSummary {
            bullish_breaks: 2,
            early_entries: 1,
            ..ScanSummary::default()
        };
        assert_eq!(summary.total_signals(), 3);
        assert!(ScanSummary::skipped("Outside trading hours").skipped);
        assert!(ScanSummary::failed("No data fetched").error.is_some());
    }
}
