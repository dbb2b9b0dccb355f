use super::Status;
use serde::{Deserialize, Serialize};

/// Persisted per-ticker state
///
/// A two-generation record: `previous_*` always holds the values from before
/// the latest update, never older history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolState {
    pub is_bullish: bool,
    pub status: Status,
    pub score: u32,
    /// Local timestamp of the update, RFC 3339
    pub updated_at: String,
    #[serde(default)]
    pub previous_is_bullish: Option<bool>,
    #[serde(default)]
    pub previous_status: Option<Status>,
}

impl SymbolState {
    /// Build the next generation from an optional prior record
    pub fn next(
        previous: Option<&SymbolState>,
        is_bullish: bool,
        status: Status,
        score: u32,
        updated_at: String,
    ) -> Self {
        Self {
            is_bullish,
            status,
            score,
            updated_at,
            previous_is_bullish: previous.map(|p| p.is_bullish),
            previous_status: previous.map(|p| p.status),
        }
    }
}
