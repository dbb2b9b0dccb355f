//! Daily alert ledger - which tickers were already alerted today, per signal type
//!
//! Exactly one day is active at a time. Any access with a different local
//! date wipes all five lists and moves the ledger to that date.

use crate::error::Result;
use crate::models::SignalKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Persisted as `{"date": "YYYY-MM-DD", "bullish_break": [...], ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLedger {
    pub date: NaiveDate,
    #[serde(default)]
    pub bullish_break: Vec<String>,
    #[serde(default)]
    pub bearish_break: Vec<String>,
    #[serde(default)]
    pub stoch_crossover: Vec<String>,
    #[serde(default)]
    pub accumulation: Vec<String>,
    #[serde(default)]
    pub early_entry: Vec<String>,
}

impl AlertLedger {
    /// Empty ledger for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            bullish_break: Vec::new(),
            bearish_break: Vec::new(),
            stoch_crossover: Vec::new(),
            accumulation: Vec::new(),
            early_entry: Vec::new(),
        }
    }

    /// Load the ledger, resetting it when missing, unreadable or stale
    pub fn load(path: &Path, today: NaiveDate) -> Self {
        let mut ledger = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AlertLedger>(&content) {
                Ok(ledger) => ledger,
                Err(e) => {
                    warn!("Failed to parse daily alerts from {}: {}. Resetting.", path.display(), e);
                    Self::new(today)
                }
            },
            Err(_) => {
                debug!("No daily alerts at {}, starting fresh", path.display());
                Self::new(today)
            }
        };

        ledger.roll_over(today);
        ledger
    }

    /// Write the ledger to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reset to empty lists when `today` differs from the stored date.
    /// Returns true when a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        *self = Self::new(today);
        info!("Daily alerts reset for {}", today);
        true
    }

    pub fn tickers(&self, kind: SignalKind) -> &[String] {
        match kind {
            SignalKind::BullishBreak => &self.bullish_break,
            SignalKind::BearishBreak => &self.bearish_break,
            SignalKind::StochCrossover => &self.stoch_crossover,
            SignalKind::Accumulation => &self.accumulation,
            SignalKind::EarlyEntry => &self.early_entry,
        }
    }

    fn tickers_mut(&mut self, kind: SignalKind) -> &mut Vec<String> {
        match kind {
            SignalKind::BullishBreak => &mut self.bullish_break,
            SignalKind::BearishBreak => &mut self.bearish_break,
            SignalKind::StochCrossover => &mut self.stoch_crossover,
            SignalKind::Accumulation => &mut self.accumulation,
            SignalKind::EarlyEntry => &mut self.early_entry,
        }
    }

    /// Whether `ticker` was alerted for `kind` today (rolls over first)
    pub fn is_already_alerted(&mut self, kind: SignalKind, ticker: &str, today: NaiveDate) -> bool {
        self.roll_over(today);
        self.tickers(kind).iter().any(|t| t == ticker)
    }

    /// Record an alert; returns false when the pair was already present
    pub fn add_alerted(&mut self, kind: SignalKind, ticker: &str) -> bool {
        let list = self.tickers_mut(kind);
        if list.iter().any(|t| t == ticker) {
            return false;
        }
        list.push(ticker.to_string());
        true
    }

    /// Total alerted pairs across all signal types
    pub fn total(&self) -> usize {
        SignalKind::ALL.iter().map(|kind| self.tickers(*kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
