//! Indicator pipeline, trend state machine, scoring and signal detection
//!
//! Everything in here is pure: no I/O and no state shared across symbols.

pub mod indicators;
pub mod scoring;
pub mod series;
pub mod signals;
pub mod supertrend;

pub use indicators::{FrameRow, IndicatorFrame};
pub use scoring::{calculate_total_score, classify_status, ScoreBreakdown};
pub use signals::{
    analyze_stock, filter_all_current_signals, filter_signals, has_any_signal, scan_all_stocks,
    CurrentSignals, EarlyEntryCheck, SignalMap,
};
pub use supertrend::{calculate_supertrend, Direction, SupertrendSeries};
