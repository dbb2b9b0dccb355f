//! Supertrend trend state machine
//!
//! Bands are computed from `hl2 ± multiplier × ATR(period)` and then
//! ratcheted row by row: the upper band only moves down and the lower band
//! only moves up until price closes through them. Each row depends on the
//! previous row's bands and direction, so the computation is a single
//! sequential pass.
//!
//! Breaks are crossover events of close against the supertrend line, not
//! direction changes. The two usually coincide but are not the same column.

use super::series::{crossover, crossunder, rolling_mean, true_range};
use serde::{Deserialize, Serialize};

/// Trend direction. There is no neutral state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Direction::Bullish)
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Bullish
    }
}

/// Per-row Supertrend output, aligned with the input candles
#[derive(Debug, Clone, Default)]
pub struct SupertrendSeries {
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    pub direction: Vec<Direction>,
    /// Lower band while bullish, upper band while bearish
    pub supertrend: Vec<f64>,
    /// Close crossed above the supertrend line on this row
    pub bullish_break: Vec<bool>,
    /// Close crossed below the supertrend line on this row
    pub bearish_break: Vec<bool>,
    /// Direction differs from the previous row (row 0 is false)
    pub direction_changed: Vec<bool>,
}

impl SupertrendSeries {
    pub fn len(&self) -> usize {
        self.direction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direction.is_empty()
    }

    /// Direction of the last row (bullish when empty, matching the ratchet start)
    pub fn latest_direction(&self) -> Direction {
        self.direction.last().copied().unwrap_or_default()
    }

    /// Supertrend value of the last row (0.0 when empty)
    pub fn latest_value(&self) -> f64 {
        self.supertrend.last().copied().unwrap_or(0.0)
    }

    /// Whether the last row is a bullish break; needs at least two rows
    pub fn just_turned_bullish(&self) -> bool {
        self.len() >= 2 && self.bullish_break.last().copied().unwrap_or(false)
    }

    /// Whether the last row is a bearish break; needs at least two rows
    pub fn just_turned_bearish(&self) -> bool {
        self.len() >= 2 && self.bearish_break.last().copied().unwrap_or(false)
    }
}

/// Calculate Supertrend over aligned high/low/close columns
///
/// # Arguments
/// * `period` - ATR period (10 by default)
/// * `multiplier` - ATR multiplier (3.0 by default)
///
/// # Returns
/// * Bands, direction, supertrend line and break flags, one row per input.
///   Rows before the ATR is available keep NaN bands and the initial
///   bullish direction.
pub fn calculate_supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    multiplier: f64,
) -> SupertrendSeries {
    let n = high.len().min(low.len()).min(close.len());
    let atr = rolling_mean(&true_range(&high[..n], &low[..n], &close[..n]), period);

    let mut upper_band = Vec::with_capacity(n);
    let mut lower_band = Vec::with_capacity(n);
    for i in 0..n {
        let hl2 = (high[i] + low[i]) / 2.0;
        upper_band.push(hl2 + multiplier * atr[i]);
        lower_band.push(hl2 - multiplier * atr[i]);
    }
    let basic_upper = upper_band.clone();
    let basic_lower = lower_band.clone();

    let mut direction = vec![Direction::Bullish; n];

    for i in 1..n {
        if basic_upper[i].is_nan() || upper_band[i - 1].is_nan() {
            continue;
        }

        upper_band[i] = if basic_upper[i] < upper_band[i - 1] || close[i - 1] > upper_band[i - 1] {
            basic_upper[i]
        } else {
            upper_band[i - 1]
        };

        lower_band[i] = if basic_lower[i] > lower_band[i - 1] || close[i - 1] < lower_band[i - 1] {
            basic_lower[i]
        } else {
            lower_band[i - 1]
        };

        direction[i] = match direction[i - 1] {
            Direction::Bearish if close[i] > upper_band[i - 1] => Direction::Bullish,
            Direction::Bearish => Direction::Bearish,
            Direction::Bullish if close[i] < lower_band[i - 1] => Direction::Bearish,
            Direction::Bullish => Direction::Bullish,
        };
    }

    let supertrend: Vec<f64> = (0..n)
        .map(|i| match direction[i] {
            Direction::Bullish => lower_band[i],
            Direction::Bearish => upper_band[i],
        })
        .collect();

    let bullish_break = crossover(&close[..n], &supertrend);
    let bearish_break = crossunder(&close[..n], &supertrend);

    let mut direction_changed = vec![false; n];
    for i in 1..n {
        direction_changed[i] = direction[i] != direction[i - 1];
    }

    SupertrendSeries {
        upper_band,
        lower_band,
        direction,
        supertrend,
        bullish_break,
        bearish_break,
        direction_changed,
    }
}
