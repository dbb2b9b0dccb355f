//! Indicator pipeline
//!
//! Turns a candle series into an [`IndicatorFrame`]: one row per candle with
//! EMA alignment, RSI, Stochastic-RSI, ATR, ADX, volume analytics, momentum,
//! Fibonacci/DCA zones and the Supertrend state. All functions are pure and
//! deterministic; undefined values stay NaN and every boolean derived from a
//! NaN comparison is false.

use super::series::{
    crossover, crossunder, diff, ema, rate_of_change, rolling_max, rolling_mean, rolling_min,
    true_range,
};
use super::supertrend::{calculate_supertrend, Direction, SupertrendSeries};
use crate::constants::*;
use crate::models::Ohlcv;

/// EMA columns and alignment flags
#[derive(Debug, Clone, Default)]
pub struct EmaColumns {
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub ema200: Vec<f64>,
    /// ema20 > ema50 > ema200
    pub bullish_alignment: Vec<bool>,
    /// ema20 < ema50 < ema200
    pub bearish_alignment: Vec<bool>,
    pub price_above_ema20: Vec<bool>,
    pub price_above_ema50: Vec<bool>,
    pub price_above_ema200: Vec<bool>,
}

/// Stochastic-RSI columns
#[derive(Debug, Clone, Default)]
pub struct StochColumns {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub overbought: Vec<bool>,
    pub oversold: Vec<bool>,
    pub neutral: Vec<bool>,
    pub k_cross_up: Vec<bool>,
    pub k_cross_down: Vec<bool>,
}

/// ATR columns
#[derive(Debug, Clone, Default)]
pub struct AtrColumns {
    pub tr: Vec<f64>,
    pub atr: Vec<f64>,
    pub atr_percent: Vec<f64>,
    pub is_volatile_enough: Vec<bool>,
}

/// ADX columns
#[derive(Debug, Clone, Default)]
pub struct AdxColumns {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
    pub is_trending: Vec<bool>,
    pub is_sideways: Vec<bool>,
}

/// Volume analytics columns
#[derive(Debug, Clone, Default)]
pub struct VolumeColumns {
    pub avg_volume: Vec<f64>,
    pub volume_ratio: Vec<f64>,
    pub is_volume_spike: Vec<bool>,
    pub is_unusual_volume: Vec<bool>,
    /// Volume on bars that closed up vs the previous close, else 0
    pub volume_on_up: Vec<f64>,
    /// Volume on bars that closed down vs the previous close, else 0
    pub volume_on_down: Vec<f64>,
    pub avg_volume_up: Vec<f64>,
    pub avg_volume_down: Vec<f64>,
    pub volume_bias_bullish: Vec<bool>,
}

/// Momentum columns
#[derive(Debug, Clone, Default)]
pub struct MomentumColumns {
    pub roc: Vec<f64>,
    pub is_positive_momentum: Vec<bool>,
    pub is_strong_momentum: Vec<bool>,
}

/// Fibonacci retracement / DCA zone columns
#[derive(Debug, Clone, Default)]
pub struct DcaColumns {
    pub swing_high: Vec<f64>,
    pub swing_low: Vec<f64>,
    pub fib_618: Vec<f64>,
    pub fib_850: Vec<f64>,
    pub in_dca_zone1: Vec<bool>,
    pub in_dca_zone2: Vec<bool>,
    pub is_low_volume_correction: Vec<bool>,
    pub is_distribution: Vec<bool>,
    pub is_healthy_correction: Vec<bool>,
    /// Percent below the 10-row high
    pub price_from_high: Vec<f64>,
    pub is_in_correction: Vec<bool>,
    pub ema20_touch: Vec<bool>,
    pub ema50_touch: Vec<bool>,
}

/// Candle series augmented with every derived column
///
/// Same length and alignment as the input candles. Built fresh each scan
/// cycle and never persisted.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    /// close × volume
    pub turnover: Vec<f64>,
    pub avg_turnover_5d: Vec<f64>,
    pub ema: EmaColumns,
    pub rsi: Vec<f64>,
    pub stoch: StochColumns,
    pub atr: AtrColumns,
    pub adx: AdxColumns,
    pub volume_stats: VolumeColumns,
    pub momentum: MomentumColumns,
    pub dca: DcaColumns,
    pub supertrend: SupertrendSeries,
}

/// Scalar snapshot of one frame row, the input to scoring and signals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameRow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub direction: Direction,
    pub supertrend: f64,
    pub bullish_break: bool,
    pub bearish_break: bool,
    pub ema_bullish_alignment: bool,
    pub price_above_ema20: bool,
    pub price_above_ema50: bool,
    pub price_above_ema200: bool,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub stoch_oversold: bool,
    pub stoch_neutral: bool,
    pub stoch_k_cross_up: bool,
    pub is_volatile_enough: bool,
    pub is_trending: bool,
    pub is_sideways: bool,
    pub volume_ratio: f64,
    pub is_volume_spike: bool,
    pub is_unusual_volume: bool,
    pub volume_bias_bullish: bool,
    pub is_positive_momentum: bool,
    pub is_strong_momentum: bool,
    pub is_healthy_correction: bool,
}

impl IndicatorFrame {
    /// Run the full pipeline over a candle series
    pub fn from_candles(candles: &[Ohlcv]) -> Self {
        let open: Vec<f64> = candles.iter().map(|c| c.open).collect();
        let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volume: Vec<f64> = candles.iter().map(|c| c.volume as f64).collect();

        let turnover: Vec<f64> = candles.iter().map(|c| c.turnover()).collect();
        let avg_turnover_5d = rolling_mean(&turnover, TURNOVER_PERIOD);

        let supertrend =
            calculate_supertrend(&high, &low, &close, SUPERTREND_PERIOD, SUPERTREND_MULTIPLIER);
        let ema = calculate_emas(&close);
        let rsi = calculate_rsi(&close, RSI_PERIOD);
        let stoch = calculate_stochastic_rsi(&rsi);
        let atr = calculate_atr(&high, &low, &close, ATR_PERIOD);
        let adx = calculate_adx(&high, &low, &atr.atr, ADX_PERIOD);
        let volume_stats = calculate_volume_analysis(&close, &volume);
        let momentum = calculate_momentum(&close, ROC_PERIOD);
        let dca = calculate_dca_zones(&high, &low, &close, &volume, &volume_stats, &ema);

        Self {
            open,
            high,
            low,
            close,
            volume,
            turnover,
            avg_turnover_5d,
            ema,
            rsi,
            stoch,
            atr,
            adx,
            volume_stats,
            momentum,
            dca,
            supertrend,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Snapshot of row `i`, or None when out of range
    pub fn row(&self, i: usize) -> Option<FrameRow> {
        if i >= self.len() {
            return None;
        }

        Some(FrameRow {
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
            direction: self.supertrend.direction[i],
            supertrend: self.supertrend.supertrend[i],
            bullish_break: self.supertrend.bullish_break[i],
            bearish_break: self.supertrend.bearish_break[i],
            ema_bullish_alignment: self.ema.bullish_alignment[i],
            price_above_ema20: self.ema.price_above_ema20[i],
            price_above_ema50: self.ema.price_above_ema50[i],
            price_above_ema200: self.ema.price_above_ema200[i],
            stoch_k: self.stoch.k[i],
            stoch_d: self.stoch.d[i],
            stoch_oversold: self.stoch.oversold[i],
            stoch_neutral: self.stoch.neutral[i],
            stoch_k_cross_up: self.stoch.k_cross_up[i],
            is_volatile_enough: self.atr.is_volatile_enough[i],
            is_trending: self.adx.is_trending[i],
            is_sideways: self.adx.is_sideways[i],
            volume_ratio: self.volume_stats.volume_ratio[i],
            is_volume_spike: self.volume_stats.is_volume_spike[i],
            is_unusual_volume: self.volume_stats.is_unusual_volume[i],
            volume_bias_bullish: self.volume_stats.volume_bias_bullish[i],
            is_positive_momentum: self.momentum.is_positive_momentum[i],
            is_strong_momentum: self.momentum.is_strong_momentum[i],
            is_healthy_correction: self.dca.is_healthy_correction[i],
        })
    }

    /// Snapshot of the last row
    pub fn latest(&self) -> Option<FrameRow> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    /// Snapshot of the row before the last
    pub fn previous(&self) -> Option<FrameRow> {
        self.len().checked_sub(2).and_then(|i| self.row(i))
    }
}

/// Calculate EMA20/50/200 with alignment and price-position flags
pub fn calculate_emas(close: &[f64]) -> EmaColumns {
    let ema20 = ema(close, EMA_FAST);
    let ema50 = ema(close, EMA_MEDIUM);
    let ema200 = ema(close, EMA_SLOW);

    let n = close.len();
    let bullish_alignment = (0..n).map(|i| ema20[i] > ema50[i] && ema50[i] > ema200[i]).collect();
    let bearish_alignment = (0..n).map(|i| ema20[i] < ema50[i] && ema50[i] < ema200[i]).collect();
    let price_above_ema20 = (0..n).map(|i| close[i] > ema20[i]).collect();
    let price_above_ema50 = (0..n).map(|i| close[i] > ema50[i]).collect();
    let price_above_ema200 = (0..n).map(|i| close[i] > ema200[i]).collect();

    EmaColumns {
        ema20,
        ema50,
        ema200,
        bullish_alignment,
        bearish_alignment,
        price_above_ema20,
        price_above_ema50,
        price_above_ema200,
    }
}

/// Calculate RSI from simple rolling means of gains and losses
///
/// The first delta counts as zero movement, so RSI is defined from row
/// `period - 1`. A window with no losses has an undefined relative strength
/// and yields NaN rather than a clamped 100.
pub fn calculate_rsi(close: &[f64], period: usize) -> Vec<f64> {
    let delta = diff(close);
    let gain: Vec<f64> = delta.iter().map(|d| if *d > 0.0 { *d } else { 0.0 }).collect();
    let loss: Vec<f64> = delta.iter().map(|d| if *d < 0.0 { -*d } else { 0.0 }).collect();

    let avg_gain = rolling_mean(&gain, period);
    let avg_loss = rolling_mean(&loss, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            if g.is_nan() || l.is_nan() || *l == 0.0 {
                f64::NAN
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }
        })
        .collect()
}

/// Calculate Stochastic-RSI %K and %D
///
/// RSI is min-max normalised over `STOCH_PERIOD` rows into [0, 100]; a flat
/// or undefined window falls back to 50. %K is the 3-row mean of that raw
/// value and %D the 3-row mean of %K.
pub fn calculate_stochastic_rsi(rsi: &[f64]) -> StochColumns {
    let lowest = rolling_min(rsi, STOCH_PERIOD);
    let highest = rolling_max(rsi, STOCH_PERIOD);

    let raw: Vec<f64> = (0..rsi.len())
        .map(|i| {
            let value = 100.0 * (rsi[i] - lowest[i]) / (highest[i] - lowest[i]);
            if value.is_finite() {
                value
            } else {
                STOCH_NEUTRAL_FILL
            }
        })
        .collect();

    let k = rolling_mean(&raw, SMOOTH_K);
    let d = rolling_mean(&k, SMOOTH_D);

    let overbought: Vec<bool> = k.iter().map(|v| *v >= STOCH_OVERBOUGHT).collect();
    let oversold: Vec<bool> = k.iter().map(|v| *v <= STOCH_OVERSOLD).collect();
    let neutral = overbought
        .iter()
        .zip(&oversold)
        .map(|(ob, os)| !ob && !os)
        .collect();
    let k_cross_up = crossover(&k, &d);
    let k_cross_down = crossunder(&k, &d);

    StochColumns {
        k,
        d,
        overbought,
        oversold,
        neutral,
        k_cross_up,
        k_cross_down,
    }
}

/// Calculate ATR as the simple rolling mean of true range
pub fn calculate_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> AtrColumns {
    let tr = true_range(high, low, close);
    let atr = rolling_mean(&tr, period);
    let atr_percent: Vec<f64> = atr.iter().zip(close).map(|(a, c)| a / c * 100.0).collect();
    let is_volatile_enough = atr_percent.iter().map(|p| *p >= MIN_ATR_PERCENT).collect();

    AtrColumns {
        tr,
        atr,
        atr_percent,
        is_volatile_enough,
    }
}

/// Calculate ADX from directional movement smoothed against ATR
///
/// +DM wins only when the up-move beats the down-move and is positive,
/// -DM mirrors it, otherwise both are zero.
pub fn calculate_adx(high: &[f64], low: &[f64], atr: &[f64], period: usize) -> AdxColumns {
    let high_diff = diff(high);
    let low_diff: Vec<f64> = diff(low).iter().map(|d| -d).collect();

    let plus_dm: Vec<f64> = high_diff
        .iter()
        .zip(&low_diff)
        .map(|(up, down)| if up > down && *up > 0.0 { *up } else { 0.0 })
        .collect();
    let minus_dm: Vec<f64> = high_diff
        .iter()
        .zip(&low_diff)
        .map(|(up, down)| if down > up && *down > 0.0 { *down } else { 0.0 })
        .collect();

    let plus_dm_avg = rolling_mean(&plus_dm, period);
    let minus_dm_avg = rolling_mean(&minus_dm, period);

    let plus_di: Vec<f64> = plus_dm_avg.iter().zip(atr).map(|(dm, a)| 100.0 * dm / a).collect();
    let minus_di: Vec<f64> = minus_dm_avg.iter().zip(atr).map(|(dm, a)| 100.0 * dm / a).collect();

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| {
            let value = 100.0 * (p - m).abs() / (p + m);
            if value.is_finite() {
                value
            } else {
                f64::NAN
            }
        })
        .collect();
    let adx = rolling_mean(&dx, period);

    let is_trending = adx.iter().map(|a| *a > ADX_THRESHOLD).collect();
    let is_sideways = adx.iter().map(|a| *a <= ADX_THRESHOLD).collect();

    AdxColumns {
        plus_di,
        minus_di,
        adx,
        is_trending,
        is_sideways,
    }
}

/// Calculate volume averages, spike flags and up/down volume bias
pub fn calculate_volume_analysis(close: &[f64], volume: &[f64]) -> VolumeColumns {
    let avg_volume = rolling_mean(volume, VOLUME_PERIOD);
    let volume_ratio: Vec<f64> = volume.iter().zip(&avg_volume).map(|(v, a)| v / a).collect();
    let is_volume_spike = volume_ratio.iter().map(|r| *r >= VOLUME_SPIKE_THRESHOLD).collect();
    let is_unusual_volume = volume_ratio.iter().map(|r| *r >= UNUSUAL_VOLUME_THRESHOLD).collect();

    let price_change = diff(close);
    let volume_on_up: Vec<f64> = price_change
        .iter()
        .zip(volume)
        .map(|(c, v)| if *c > 0.0 { *v } else { 0.0 })
        .collect();
    let volume_on_down: Vec<f64> = price_change
        .iter()
        .zip(volume)
        .map(|(c, v)| if *c < 0.0 { *v } else { 0.0 })
        .collect();

    let avg_volume_up = rolling_mean(&volume_on_up, VOLUME_PERIOD);
    let avg_volume_down = rolling_mean(&volume_on_down, VOLUME_PERIOD);
    let volume_bias_bullish = avg_volume_up
        .iter()
        .zip(&avg_volume_down)
        .map(|(up, down)| up > down)
        .collect();

    VolumeColumns {
        avg_volume,
        volume_ratio,
        is_volume_spike,
        is_unusual_volume,
        volume_on_up,
        volume_on_down,
        avg_volume_up,
        avg_volume_down,
        volume_bias_bullish,
    }
}

/// Calculate rate-of-change momentum
pub fn calculate_momentum(close: &[f64], period: usize) -> MomentumColumns {
    let roc = rate_of_change(close, period);
    let is_positive_momentum = roc.iter().map(|r| *r > 0.0).collect();
    let is_strong_momentum = roc.iter().map(|r| r.abs() > STRONG_MOMENTUM_PERCENT).collect();

    MomentumColumns {
        roc,
        is_positive_momentum,
        is_strong_momentum,
    }
}

/// Calculate Fibonacci DCA zones and healthy-correction flags
///
/// Zone 1 sits between the 61.8% and 85% retracement of the 20-row swing
/// range measured from the high; zone 2 is anything deeper. A healthy
/// correction has 5-row volume under 70% of the 20-row average and no
/// distribution (5-row down-volume above 1.5× up-volume).
pub fn calculate_dca_zones(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    volume_stats: &VolumeColumns,
    emas: &EmaColumns,
) -> DcaColumns {
    let n = close.len();
    let swing_high = rolling_max(high, DCA_LOOKBACK);
    let swing_low = rolling_min(low, DCA_LOOKBACK);

    let mut fib_618 = Vec::with_capacity(n);
    let mut fib_850 = Vec::with_capacity(n);
    for i in 0..n {
        let range = swing_high[i] - swing_low[i];
        fib_618.push(swing_high[i] - range * FIB_LEVEL_1 / 100.0);
        fib_850.push(swing_high[i] - range * FIB_LEVEL_2 / 100.0);
    }

    let in_dca_zone1 = (0..n).map(|i| close[i] <= fib_618[i] && close[i] > fib_850[i]).collect();
    let in_dca_zone2 = (0..n).map(|i| close[i] <= fib_850[i]).collect();

    let short_term_volume = rolling_mean(volume, DCA_SHORT_VOLUME_PERIOD);
    let is_low_volume_correction: Vec<bool> = (0..n)
        .map(|i| short_term_volume[i] < volume_stats.avg_volume[i] * DCA_VOLUME_THRESHOLD)
        .collect();

    let recent_down_volume = rolling_mean(&volume_stats.volume_on_down, DCA_SHORT_VOLUME_PERIOD);
    let recent_up_volume = rolling_mean(&volume_stats.volume_on_up, DCA_SHORT_VOLUME_PERIOD);
    let is_distribution: Vec<bool> = (0..n)
        .map(|i| recent_down_volume[i] > recent_up_volume[i] * DISTRIBUTION_RATIO)
        .collect();

    let is_healthy_correction = (0..n)
        .map(|i| is_low_volume_correction[i] && !is_distribution[i])
        .collect();

    let recent_high = rolling_max(high, RECENT_HIGH_PERIOD);
    let price_from_high: Vec<f64> = (0..n)
        .map(|i| (recent_high[i] - close[i]) / recent_high[i] * 100.0)
        .collect();
    let is_in_correction = price_from_high.iter().map(|p| *p > MIN_CORRECTION_FROM_HIGH).collect();

    let ema20_touch = (0..n)
        .map(|i| low[i] <= emas.ema20[i] && close[i] > emas.ema20[i] * 0.99)
        .collect();
    let ema50_touch = (0..n)
        .map(|i| low[i] <= emas.ema50[i] && close[i] > emas.ema50[i] * 0.99)
        .collect();

    DcaColumns {
        swing_high,
        swing_low,
        fib_618,
        fib_850,
        in_dca_zone1,
        in_dca_zone2,
        is_low_volume_correction,
        is_distribution,
        is_healthy_correction,
        price_from_high,
        is_in_correction,
        ema20_touch,
        ema50_touch,
    }
}
