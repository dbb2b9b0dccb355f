use serde::{Deserialize, Serialize};
use std::fmt;

/// Score-derived status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "ACCUMULATE")]
    Accumulate,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "AVOID")]
    Avoid,
    /// Not enough history to score
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::StrongBuy => "STRONG BUY",
            Status::Accumulate => "ACCUMULATE",
            Status::Hold => "HOLD",
            Status::Avoid => "AVOID",
            Status::Unknown => "UNKNOWN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Status::StrongBuy => "🟢",
            Status::Accumulate => "🔵",
            Status::Hold => "🟡",
            Status::Avoid => "🔴",
            Status::Unknown => "⚪",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Unknown
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five alertable signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    BullishBreak,
    BearishBreak,
    StochCrossover,
    Accumulation,
    EarlyEntry,
}

impl SignalKind {
    /// Alert order used for messages and summaries
    pub const ALL: [SignalKind; 5] = [
        SignalKind::BullishBreak,
        SignalKind::BearishBreak,
        SignalKind::StochCrossover,
        SignalKind::Accumulation,
        SignalKind::EarlyEntry,
    ];

    /// Persisted key ("bullish_break", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::BullishBreak => "bullish_break",
            SignalKind::BearishBreak => "bearish_break",
            SignalKind::StochCrossover => "stoch_crossover",
            SignalKind::Accumulation => "accumulation",
            SignalKind::EarlyEntry => "early_entry",
        }
    }

    /// Parse from the persisted key (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "bullish_break" => Ok(SignalKind::BullishBreak),
            "bearish_break" => Ok(SignalKind::BearishBreak),
            "stoch_crossover" => Ok(SignalKind::StochCrossover),
            "accumulation" => Ok(SignalKind::Accumulation),
            "early_entry" => Ok(SignalKind::EarlyEntry),
            _ => Err(format!("Invalid signal type: {}", s)),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-symbol snapshot of one scan cycle
///
/// Built once by the analyzer and read-only afterwards. A result for a symbol
/// with too little history keeps every signal false and the status `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    pub ticker: String,
    pub price: f64,
    pub change_percent: f64,
    pub supertrend_value: f64,
    pub is_bullish: bool,
    pub score: u32,
    pub status: Status,

    // Signals
    pub bullish_break: bool,
    pub bearish_break: bool,
    pub is_stoch_crossover: bool,
    pub is_accumulation: bool,
    pub is_early_entry: bool,
    /// Early-entry sub-conditions met, 0..=7
    pub early_entry_strength: u8,
    /// Drop from the previous close in percent (negative on up days)
    pub correction_percent: f64,

    // Display and gating context
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub volume_ratio: f64,
    pub daily_turnover: f64,
    pub avg_turnover_5d: f64,
}

impl ScanResult {
    /// Neutral result for a ticker
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    /// Whether this result raised the given signal
    pub fn has_signal(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::BullishBreak => self.bullish_break,
            SignalKind::BearishBreak => self.bearish_break,
            SignalKind::StochCrossover => self.is_stoch_crossover,
            SignalKind::Accumulation => self.is_accumulation,
            SignalKind::EarlyEntry => self.is_early_entry,
        }
    }

    /// Whether the 5-day average turnover clears the liquidity gate
    pub fn is_liquid(&self, min_turnover: f64) -> bool {
        self.avg_turnover_5d >= min_turnover
    }

    /// Ticker without the exchange suffix ("BBCA.JK" -> "BBCA")
    pub fn display_ticker(&self) -> &str {
        strip_exchange_suffix(&self.ticker)
    }
}

/// Strip the ".JK" exchange suffix for display
pub fn strip_exchange_suffix(ticker: &str) -> &str {
    ticker.strip_suffix(".JK").unwrap_or(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_kind_round_trip_names() {
        for kind in SignalKind::ALL {
            assert_eq!(SignalKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(SignalKind::from_str("golden_cross").is_err());
    }

    #[test]
    fn test_status_serializes_as_label() {
        let json = serde_json::to_string(&Status::StrongBuy).unwrap();
        assert_eq!(json, "\"STRONG BUY\"");
        let status: Status = serde_json::from_str("\"HOLD\"").unwrap();
        assert_eq!(status, Status::Hold);
    }

    #[test]
    fn test_scan_result_defaults_are_neutral() {
        let result = ScanResult::new("BBCA.JK");
        assert_eq!(result.status, Status::Unknown);
        assert!(SignalKind::ALL.iter().all(|k| !result.has_signal(*k)));
        assert_eq!(result.display_ticker(), "BBCA");
        assert!(!result.is_liquid(1.0));
    }
}
