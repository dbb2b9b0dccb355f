//! Multi-factor scoring
//!
//! Five capped sub-scores over the latest frame row, summed, penalised in
//! quiet sideways markets and mapped onto a status label.

use super::indicators::FrameRow;
use crate::constants::{ACCUMULATE_THRESHOLD, BUY_THRESHOLD, HOLD_THRESHOLD, SIDEWAYS_PENALTY};
use crate::models::Status;
use serde::Serialize;

pub const MAX_TREND_SCORE: u32 = 25;
pub const MAX_REGIME_SCORE: u32 = 15;
pub const MAX_VOLUME_SCORE: u32 = 20;
pub const MAX_MOMENTUM_SCORE: u32 = 22;
pub const MAX_POSITION_SCORE: u32 = 18;

/// Individual sub-scores behind a total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub trend: u32,
    pub regime: u32,
    pub volume: u32,
    pub momentum: u32,
    pub position: u32,
}

impl ScoreBreakdown {
    /// Compute every sub-score for a row
    pub fn from_row(row: &FrameRow) -> Self {
        Self {
            trend: trend_score(row),
            regime: regime_score(row),
            volume: volume_score(row),
            momentum: momentum_score(row),
            position: position_score(row),
        }
    }

    /// Sum before the sideways penalty
    pub fn raw_total(&self) -> u32 {
        self.trend + self.regime + self.volume + self.momentum + self.position
    }
}

/// Trend direction and EMA alignment (max 25)
pub fn trend_score(row: &FrameRow) -> u32 {
    let bullish = row.direction.is_bullish();
    let mut score = 0;

    if bullish {
        score += 10;
    }
    if row.ema_bullish_alignment {
        score += 10;
    }
    // Trend aligned
    if bullish {
        score += 5;
    }

    score.min(MAX_TREND_SCORE)
}

/// ADX trend strength and ATR volatility (max 15)
pub fn regime_score(row: &FrameRow) -> u32 {
    let mut score = 0;

    if row.is_trending {
        score += 10;
    }
    if row.is_volatile_enough {
        score += 5;
    }

    score.min(MAX_REGIME_SCORE)
}

/// Participation and volume bias (max 20)
pub fn volume_score(row: &FrameRow) -> u32 {
    let mut score = 0;

    if row.volume_ratio > 1.0 {
        score += 5;
    }
    if row.is_volume_spike {
        score += 7;
    }
    if row.is_unusual_volume {
        score += 8;
    }
    if row.volume_bias_bullish && row.direction.is_bullish() {
        score += 5;
    }

    score.min(MAX_VOLUME_SCORE)
}

/// ROC and Stochastic-RSI position (max 22)
pub fn momentum_score(row: &FrameRow) -> u32 {
    let mut score = 0;

    if row.is_positive_momentum {
        score += 10;
    }
    if row.is_strong_momentum && row.is_positive_momentum {
        score += 7;
    }
    if row.stoch_neutral {
        score += 5;
    } else if row.stoch_oversold && row.direction.is_bullish() {
        score += 10;
    }

    score.min(MAX_MOMENTUM_SCORE)
}

/// Price relative to the EMAs (max 18)
pub fn position_score(row: &FrameRow) -> u32 {
    let mut score = 0;

    if row.price_above_ema200 {
        score += 8;
    }
    if row.price_above_ema50 {
        score += 6;
    }
    if row.price_above_ema20 {
        score += 4;
    }

    score.min(MAX_POSITION_SCORE)
}

/// Map a final score onto a status, first match wins
pub fn classify_status(score: u32, is_trending: bool) -> Status {
    if score >= BUY_THRESHOLD && is_trending {
        Status::StrongBuy
    } else if score >= ACCUMULATE_THRESHOLD {
        Status::Accumulate
    } else if score >= HOLD_THRESHOLD {
        Status::Hold
    } else {
        Status::Avoid
    }
}

/// Total score (0-100) and status for a row
///
/// A sideways market without unusual volume scales the sum by 0.7 before
/// rounding. Halves round to the even neighbour.
pub fn calculate_total_score(row: &FrameRow) -> (u32, Status) {
    let breakdown = ScoreBreakdown::from_row(row);
    let mut total = breakdown.raw_total() as f64;

    if row.is_sideways && !row.is_unusual_volume {
        total *= SIDEWAYS_PENALTY;
    }

    let score = total.round_ties_even() as u32;
    (score, classify_status(score, row.is_trending))
}
