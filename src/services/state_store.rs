//! Persisted per-ticker state - the two-generation memory behind transition checks
//!
//! Read fully at cycle start and written fully at cycle end. An unreadable
//! file is treated as a first run.

use crate::error::Result;
use crate::models::{ScanResult, Status, SymbolState};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ticker -> last known state, backed by a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct SymbolStateStore {
    path: PathBuf,
    states: BTreeMap<String, SymbolState>,
}

impl SymbolStateStore {
    /// Empty store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            states: BTreeMap::new(),
        }
    }

    /// Load states from file, or start empty if missing or unreadable
    pub fn load(path: &Path) -> Self {
        let mut store = Self::new(path);

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, SymbolState>>(&content) {
                Ok(states) => {
                    info!("Loaded {} stock states", states.len());
                    store.states = states;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse stock states from {}: {}. Starting empty.",
                        path.display(),
                        e
                    );
                }
            },
            Err(_) => {
                debug!("No existing stock states at {}, starting empty", path.display());
            }
        }

        store
    }

    /// Write all states to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.states)?;
        fs::write(&self.path, content)?;
        info!("Saved {} stock states", self.states.len());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, ticker: &str) -> Option<&SymbolState> {
        self.states.get(ticker)
    }

    pub fn all(&self) -> &BTreeMap<String, SymbolState> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Replace a ticker's state, shifting the current values into `previous_*`
    pub fn update_state(
        &mut self,
        ticker: &str,
        is_bullish: bool,
        status: Status,
        score: u32,
        updated_at: String,
    ) {
        let next = SymbolState::next(self.states.get(ticker), is_bullish, status, score, updated_at);
        self.states.insert(ticker.to_string(), next);
    }

    pub fn update_from_scan_result(&mut self, result: &ScanResult, updated_at: &str) {
        self.update_state(
            &result.ticker,
            result.is_bullish,
            result.status,
            result.score,
            updated_at.to_string(),
        );
    }

    /// Bearish (or unknown direction) last time, bullish now. Never true for
    /// a ticker seen for the first time.
    pub fn is_new_bullish(&self, ticker: &str, current_is_bullish: bool) -> bool {
        match self.states.get(ticker) {
            Some(prev) => current_is_bullish && !prev.is_bullish,
            None => false,
        }
    }

    /// Bullish last time, bearish now. Never true for a new ticker.
    pub fn is_new_bearish(&self, ticker: &str, current_is_bullish: bool) -> bool {
        match self.states.get(ticker) {
            Some(prev) => !current_is_bullish && prev.is_bullish,
            None => false,
        }
    }

    /// Upgraded to STRONG BUY from HOLD or ACCUMULATE
    pub fn is_status_upgrade(&self, ticker: &str, current_status: Status) -> bool {
        let previous = self.states.get(ticker).map(|s| s.status);
        current_status == Status::StrongBuy
            && matches!(previous, Some(Status::Hold) | Some(Status::Accumulate))
    }

    /// Drop every state and persist the empty map
    pub fn clear_all(&mut self) -> Result<()> {
        self.states.clear();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stamp() -> String {
        "2026-10-16T10:00:00+07:00".to_string()
    }

    #[test]
    fn test_first_observation_never_transitions() {
        let store = SymbolStateStore::new("unused.json");
        assert!(!store.is_new_bullish("BBCA.JK", true));
        assert!(!store.is_new_bearish("BBCA.JK", false));
        assert!(!store.is_status_upgrade("BBCA.JK", Status::StrongBuy));
    }

    #[test]
    fn test_transitions_against_prior_state() {
        let mut store = SymbolStateStore::new("unused.json");
        store.update_state("BBCA.JK", false, Status::Hold, 48, stamp());

        assert!(store.is_new_bullish("BBCA.JK", true));
        assert!(!store.is_new_bullish("BBCA.JK", false));
        assert!(!store.is_new_bearish("BBCA.JK", false));
        assert!(store.is_status_upgrade("BBCA.JK", Status::StrongBuy));
        assert!(!store.is_status_upgrade("BBCA.JK", Status::Accumulate));

        store.update_state("BBCA.JK", true, Status::StrongBuy, 72, stamp());
        assert!(store.is_new_bearish("BBCA.JK", false));

        let state = store.get("BBCA.JK").unwrap();
        assert_eq!(state.previous_is_bullish, Some(false));
        assert_eq!(state.previous_status, Some(Status::Hold));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("stock_states.json");

        let mut store = SymbolStateStore::new(&path);
        let mut result = ScanResult::new("TLKM.JK");
        result.is_bullish = true;
        result.status = Status::Accumulate;
        result.score = 61;
        store.update_from_scan_result(&result, &stamp());
        store.save().unwrap();

        let loaded = SymbolStateStore::load(&path);
        assert_eq!(loaded.len(), 1);
        let state = loaded.get("TLKM.JK").unwrap();
        assert_eq!(state.status, Status::Accumulate);
        assert_eq!(state.score, 61);
        assert_eq!(state.previous_is_bullish, None);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"status\": \"ACCUMULATE\""));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock_states.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SymbolStateStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_all_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock_states.json");
        let mut store = SymbolStateStore::new(&path);
        store.update_state("ASII.JK", true, Status::Hold, 50, stamp());
        store.save().unwrap();

        store.clear_all().unwrap();
        assert!(SymbolStateStore::load(&path).is_empty());
    }
}
