//! Scanner Constants
//!
//! Fixed indicator parameters and thresholds. The indicator set is
//! deterministic: nothing here adapts at runtime.
//!
//! ## Price Format
//! All prices are full IDR values as returned by the data provider
//! (e.g. BBCA at 9,850 is stored as 9850.0).

// === SUPERTREND ===
pub const SUPERTREND_PERIOD: usize = 10;
pub const SUPERTREND_MULTIPLIER: f64 = 3.0;

// === EMA ===
pub const EMA_FAST: usize = 20;
pub const EMA_MEDIUM: usize = 50;
pub const EMA_SLOW: usize = 200;

// === VOLUME ===
pub const VOLUME_PERIOD: usize = 20;
/// Volume ratio at or above which a bar is a spike
pub const VOLUME_SPIKE_THRESHOLD: f64 = 1.5;
/// Volume ratio at or above which a bar is unusual
pub const UNUSUAL_VOLUME_THRESHOLD: f64 = 2.5;

// === STOCHASTIC RSI ===
pub const RSI_PERIOD: usize = 14;
pub const STOCH_PERIOD: usize = 14;
pub const SMOOTH_K: usize = 3;
pub const SMOOTH_D: usize = 3;
pub const STOCH_OVERBOUGHT: f64 = 80.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
/// Raw stochastic value used when the RSI window is flat or undefined
pub const STOCH_NEUTRAL_FILL: f64 = 50.0;

// === ATR & ADX ===
pub const ATR_PERIOD: usize = 14;
/// Minimum ATR as a percentage of close to count as volatile enough
pub const MIN_ATR_PERCENT: f64 = 0.5;
pub const ADX_PERIOD: usize = 14;
pub const ADX_THRESHOLD: f64 = 25.0;

// === MOMENTUM ===
pub const ROC_PERIOD: usize = 10;
/// |ROC| above this percentage is strong momentum
pub const STRONG_MOMENTUM_PERCENT: f64 = 5.0;

// === DCA / FIBONACCI ===
pub const FIB_LEVEL_1: f64 = 61.8;
pub const FIB_LEVEL_2: f64 = 85.0;
pub const DCA_LOOKBACK: usize = 20;
/// Healthy correction: short-term volume below this share of the average
pub const DCA_VOLUME_THRESHOLD: f64 = 0.7;
pub const DCA_SHORT_VOLUME_PERIOD: usize = 5;
/// Down-volume may exceed up-volume by at most this factor
pub const DISTRIBUTION_RATIO: f64 = 1.5;
pub const RECENT_HIGH_PERIOD: usize = 10;
pub const MIN_CORRECTION_FROM_HIGH: f64 = 3.0;

// === SCORING ===
pub const BUY_THRESHOLD: u32 = 60;
pub const ACCUMULATE_THRESHOLD: u32 = 60;
pub const HOLD_THRESHOLD: u32 = 45;
/// Multiplier applied to the total in a sideways, quiet market
pub const SIDEWAYS_PENALTY: f64 = 0.7;

// === SIGNALS ===
/// Minimum candles before any signal is evaluated
pub const MIN_HISTORY_FOR_SIGNALS: usize = 50;
/// Early entry: accepted drop from previous close, in percent (inclusive)
pub const EARLY_ENTRY_MIN_DROP: f64 = 3.0;
pub const EARLY_ENTRY_MAX_DROP: f64 = 12.0;
/// Early entry: today's low within this percentage of yesterday's low
pub const PRICE_DEFENDED_PERCENT: f64 = 1.5;
/// Number of early-entry sub-conditions (strength upper bound)
pub const EARLY_ENTRY_CONDITIONS: u8 = 7;

// === LIQUIDITY ===
/// 5-day average turnover needed before a symbol may alert (5 billion IDR)
pub const MIN_DAILY_TURNOVER: f64 = 5_000_000_000.0;
pub const TURNOVER_PERIOD: usize = 5;

// === TIMEZONE ===
/// Trading timezone for the IDX (WIB)
pub const TRADING_TIMEZONE: &str = "Asia/Jakarta";
