//! Per-symbol signal detection and signal grouping
//!
//! `analyze_stock` turns one candle series into a [`ScanResult`]. It only
//! looks at the latest row and the row before it; cross-cycle memory lives
//! in the state store.

use super::indicators::{FrameRow, IndicatorFrame};
use super::scoring::calculate_total_score;
use crate::constants::*;
use crate::models::{MarketData, Ohlcv, ScanResult, SignalKind};
use std::collections::BTreeMap;
use tracing::debug;

/// Signal type -> liquid results raising it, in input order
pub type SignalMap = BTreeMap<SignalKind, Vec<ScanResult>>;

/// Early-entry ("serok bawah") sub-conditions for the latest row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EarlyEntryCheck {
    /// Drop from the previous close in percent (negative on up days)
    pub drop_percent: f64,
    /// Drop between 3% and 12% on healthy (quiet, non-distribution) volume
    pub is_dry_correction: bool,
    pub no_lower_low: bool,
    /// Today's low within 1.5% of yesterday's low
    pub price_defended: bool,
    pub range_shrinking: bool,
    pub volume_increasing: bool,
    pub price_stable_or_up: bool,
    pub is_green_candle: bool,
    /// Lower wick longer than half the body
    pub has_wick_rejection: bool,
}

impl EarlyEntryCheck {
    pub fn evaluate(latest: &FrameRow, previous: &FrameRow) -> Self {
        let drop_percent = (previous.close - latest.close) / previous.close * 100.0;
        let is_dry_correction = (EARLY_ENTRY_MIN_DROP..=EARLY_ENTRY_MAX_DROP)
            .contains(&drop_percent)
            && latest.is_healthy_correction;

        let today_range = (latest.high - latest.low) / latest.close * 100.0;
        let yesterday_range = (previous.high - previous.low) / previous.close * 100.0;
        let low_diff = (latest.low - previous.low).abs() / latest.close * 100.0;

        let body = (latest.close - latest.open).abs();
        let lower_wick = latest.close.min(latest.open) - latest.low;

        Self {
            drop_percent,
            is_dry_correction,
            no_lower_low: latest.low >= previous.low,
            price_defended: low_diff < PRICE_DEFENDED_PERCENT,
            range_shrinking: today_range < yesterday_range,
            volume_increasing: latest.volume > previous.volume,
            price_stable_or_up: latest.close >= previous.close,
            is_green_candle: latest.close > latest.open,
            has_wick_rejection: body > 0.0 && lower_wick > body * 0.5,
        }
    }

    pub fn is_price_holding(&self) -> bool {
        self.no_lower_low || self.price_defended || self.range_shrinking
    }

    pub fn has_early_buying(&self) -> bool {
        self.volume_increasing
            || self.price_stable_or_up
            || self.is_green_candle
            || self.has_wick_rejection
    }

    /// Number of the seven ranked sub-conditions met
    pub fn strength(&self) -> u8 {
        [
            self.is_dry_correction,
            self.no_lower_low,
            self.price_defended,
            self.range_shrinking,
            self.volume_increasing,
            self.is_green_candle,
            self.has_wick_rejection,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }

    /// Gate: dry correction plus holding or early buying. Direction is
    /// checked by the caller.
    pub fn passes(&self) -> bool {
        self.is_dry_correction && (self.is_price_holding() || self.has_early_buying())
    }
}

/// Analyze one symbol's candles into a scan result
///
/// Histories shorter than 50 rows return a neutral result with status
/// `Unknown` and every signal off.
pub fn analyze_stock(ticker: &str, candles: &[Ohlcv]) -> ScanResult {
    let mut result = ScanResult::new(ticker);

    if candles.len() < MIN_HISTORY_FOR_SIGNALS {
        debug!(ticker = %ticker, rows = candles.len(), "Not enough history");
        return result;
    }

    let frame = IndicatorFrame::from_candles(candles);
    let (latest, previous) = match (frame.latest(), frame.previous()) {
        (Some(latest), Some(previous)) => (latest, previous),
        _ => return result,
    };
    let last = frame.len() - 1;

    result.daily_turnover = frame.turnover[last];
    result.avg_turnover_5d = frame.avg_turnover_5d[last];

    result.price = latest.close;
    result.supertrend_value = latest.supertrend;
    result.is_bullish = latest.direction.is_bullish();
    result.volume_ratio = latest.volume_ratio;
    result.stoch_k = latest.stoch_k;
    result.stoch_d = latest.stoch_d;

    if previous.close > 0.0 {
        result.change_percent = (latest.close - previous.close) / previous.close * 100.0;
    }

    let (score, status) = calculate_total_score(&latest);
    result.score = score;
    result.status = status;

    result.bullish_break = frame.supertrend.just_turned_bullish();
    result.bearish_break = frame.supertrend.just_turned_bearish();

    result.is_stoch_crossover = result.is_bullish && latest.stoch_k_cross_up;

    let volume_signal = latest.is_volume_spike || latest.is_unusual_volume;
    result.is_accumulation = result.is_bullish
        && latest.close > latest.open
        && volume_signal
        && !latest.is_sideways;

    let early = EarlyEntryCheck::evaluate(&latest, &previous);
    result.correction_percent = early.drop_percent;
    result.early_entry_strength = early.strength();
    result.is_early_entry = result.is_bullish && early.passes();

    result
}

/// Analyze every symbol, keyed by ticker
pub fn scan_all_stocks(stock_data: &MarketData) -> BTreeMap<String, ScanResult> {
    stock_data
        .iter()
        .map(|(ticker, candles)| (ticker.clone(), analyze_stock(ticker, candles)))
        .collect()
}

/// Empty signal map with all five signal types present
pub fn empty_signal_map() -> SignalMap {
    SignalKind::ALL.iter().map(|kind| (*kind, Vec::new())).collect()
}

/// Group liquid results by the signals they raise
///
/// Results under the minimum 5-day turnover never appear. A result can sit in
/// several lists at once.
pub fn filter_signals<'a, I>(results: I) -> SignalMap
where
    I: IntoIterator<Item = &'a ScanResult>,
{
    let mut signals = empty_signal_map();

    for result in results {
        if !result.is_liquid(MIN_DAILY_TURNOVER) {
            continue;
        }
        for kind in SignalKind::ALL {
            if result.has_signal(kind) {
                if let Some(list) = signals.get_mut(&kind) {
                    list.push(result.clone());
                }
            }
        }
    }

    signals
}

/// True when any signal list is non-empty
pub fn has_any_signal(signals: &SignalMap) -> bool {
    signals.values().any(|list| !list.is_empty())
}

/// Current-state categories for the morning recap
#[derive(Debug, Clone, Default)]
pub struct CurrentSignals {
    /// Bullish, score >= 7 and volume ratio >= 1.5
    pub strong_buy: Vec<ScanResult>,
    /// Accumulation flag, or bullish with score >= 5
    pub accumulation: Vec<ScanResult>,
    /// Bullish with score >= 3
    pub bullish: Vec<ScanResult>,
    pub early_entry: Vec<ScanResult>,
    pub stoch_crossover: Vec<ScanResult>,
    pub bearish_watch: Vec<ScanResult>,
}

impl CurrentSignals {
    pub fn is_empty(&self) -> bool {
        self.strong_buy.is_empty()
            && self.accumulation.is_empty()
            && self.bullish.is_empty()
            && self.early_entry.is_empty()
            && self.stoch_crossover.is_empty()
            && self.bearish_watch.is_empty()
    }

    fn lists_mut(&mut self) -> [&mut Vec<ScanResult>; 6] {
        [
            &mut self.strong_buy,
            &mut self.accumulation,
            &mut self.bullish,
            &mut self.early_entry,
            &mut self.stoch_crossover,
            &mut self.bearish_watch,
        ]
    }
}

/// Categorise liquid results by their current state rather than transitions
///
/// The first three categories are exclusive (first match wins); the last
/// three overlap with them. Every list is sorted by score, highest first.
pub fn filter_all_current_signals<'a, I>(results: I) -> CurrentSignals
where
    I: IntoIterator<Item = &'a ScanResult>,
{
    let mut categories = CurrentSignals::default();

    for result in results {
        if !result.is_liquid(MIN_DAILY_TURNOVER) {
            continue;
        }

        if result.is_bullish && result.score >= 7 && result.volume_ratio >= 1.5 {
            categories.strong_buy.push(result.clone());
        } else if result.is_accumulation || (result.is_bullish && result.score >= 5) {
            categories.accumulation.push(result.clone());
        } else if result.is_bullish && result.score >= 3 {
            categories.bullish.push(result.clone());
        }

        if result.is_early_entry {
            categories.early_entry.push(result.clone());
        }
        if result.is_stoch_crossover {
            categories.stoch_crossover.push(result.clone());
        }
        if result.bearish_break {
            categories.bearish_watch.push(result.clone());
        }
    }

    for list in categories.lists_mut() {
        list.sort_by(|a, b| b.score.cmp(&a.score));
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Ohlcv {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        Ohlcv::new(start + Duration::days(i as i64), open, high, low, close, volume)
    }

    /// 59 rising bars, quiet last week, long lower wick yesterday, then an 8%
    /// gap-down green candle on higher volume that holds yesterday's low.
    fn dip_buy_series() -> Vec<Ohlcv> {
        let mut candles: Vec<Ohlcv> = (0..59)
            .map(|i| {
                let close = 100.0 + 0.5 * i as f64;
                let volume = if i < 55 { 1_000_000 } else { 300_000 };
                bar(i, close - 0.5, close + 3.0, close - 3.0, close, volume)
            })
            .collect();
        candles[58].low = 115.0;
        candles.push(bar(59, 117.0, 120.0, 116.0, 129.0 * 0.92, 400_000));
        candles
    }

    fn liquid(ticker: &str) -> ScanResult {
        ScanResult {
            avg_turnover_5d: MIN_DAILY_TURNOVER,
            ..ScanResult::new(ticker)
        }
    }

    #[test]
    fn test_short_history_is_neutral() {
        let candles: Vec<Ohlcv> = (0..49)
            .map(|i| bar(i, 100.0, 101.0, 99.0, 100.5, 1_000))
            .collect();
        let result = analyze_stock("BBCA.JK", &candles);

        assert_eq!(result, ScanResult::new("BBCA.JK"));
        assert_eq!(result.status, Status::Unknown);
        assert_eq!(result.early_entry_strength, 0);
    }

    #[test]
    fn test_early_entry_on_dry_dip() {
        let candles = dip_buy_series();
        let frame = IndicatorFrame::from_candles(&candles);
        let latest = frame.latest().unwrap();
        let previous = frame.previous().unwrap();
        let check = EarlyEntryCheck::evaluate(&latest, &previous);

        assert!(latest.direction.is_bullish());
        assert!(latest.is_healthy_correction);
        assert!(check.is_dry_correction);
        assert!(check.no_lower_low);
        assert!(check.has_wick_rejection);

        let result = analyze_stock("BBRI.JK", &candles);
        assert!(result.is_bullish);
        assert!(result.is_early_entry);
        assert_eq!(result.early_entry_strength, 7);
        assert!((result.correction_percent - 8.0).abs() < 1e-9);
        assert!(result.change_percent < 0.0);
        assert!(!result.bearish_break);
    }

    #[test]
    fn test_no_early_entry_on_loud_drop() {
        let mut candles = dip_buy_series();
        // Heavy selling on the drop day breaks the healthy-correction gate
        candles[59].volume = 5_000_000;
        let result = analyze_stock("BBRI.JK", &candles);

        assert!(!result.is_early_entry);
        assert!(result.early_entry_strength < 7);
    }

    #[test]
    fn test_wick_rejection_needs_body() {
        let doji = FrameRow {
            open: 100.0,
            close: 100.0,
            high: 101.0,
            low: 95.0,
            ..FrameRow::default()
        };
        let previous = FrameRow {
            close: 100.0,
            ..doji
        };
        assert!(!EarlyEntryCheck::evaluate(&doji, &previous).has_wick_rejection);
    }

    #[test]
    fn test_rising_series_scores_and_stays_quiet() {
        let candles: Vec<Ohlcv> = (0..80)
            .map(|i| {
                let close = 1_000.0 + 5.0 * i as f64;
                bar(i, close - 2.0, close + 10.0, close - 10.0, close, 10_000_000)
            })
            .collect();
        let result = analyze_stock("TLKM.JK", &candles);

        assert!(result.is_bullish);
        assert!(!result.bullish_break);
        assert!(!result.bearish_break);
        assert!(!result.is_early_entry);
        assert!(result.score > 0);
        assert_ne!(result.status, Status::Unknown);
        assert!(result.avg_turnover_5d > MIN_DAILY_TURNOVER);
    }

    /// One green bar per close (body 0.5, range ±1) on 1M shares, except the
    /// last bar which trades `last_volume`
    fn steady_series(closes: &[f64], last_volume: u64) -> Vec<Ohlcv> {
        let last = closes.len() - 1;
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let volume = if i == last { last_volume } else { 1_000_000 };
                bar(i, c - 0.5, c + 1.0, c - 1.0, *c, volume)
            })
            .collect()
    }

    /// Repeating +a, +a, b steps, then `pull` bars lower by `pull_step`, then
    /// one bar up by `last`. Always 60 rows.
    fn zigzag_closes(start: f64, a: f64, b: f64, pull: usize, pull_step: f64, last: f64) -> Vec<f64> {
        let mut closes = vec![start];
        for i in 1..(59 - pull) {
            let step = if i % 3 == 0 { b } else { a };
            closes.push(closes[i - 1] + step);
        }
        for _ in 0..pull {
            closes.push(closes[closes.len() - 1] - pull_step);
        }
        closes.push(closes[closes.len() - 1] + last);
        closes
    }

    #[test]
    fn test_accumulation_on_trending_volume_spike() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let candles = steady_series(&closes, 3_000_000);
        let frame = IndicatorFrame::from_candles(&candles);
        let latest = frame.latest().unwrap();

        assert!(latest.is_trending);
        assert!(latest.is_volume_spike);

        let result = analyze_stock("ADRO.JK", &candles);
        assert!(result.is_bullish);
        assert!(result.is_accumulation);
        assert!(!result.is_stoch_crossover);
    }

    #[test]
    fn test_no_accumulation_when_sideways() {
        // Alternating 100 / 101 cancels directional movement: ADX 0
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 2) as f64).collect();
        let candles = steady_series(&closes, 3_000_000);
        let frame = IndicatorFrame::from_candles(&candles);
        let latest = frame.latest().unwrap();

        assert!(latest.is_sideways);
        assert!(latest.is_volume_spike);
        assert!(latest.close > latest.open);

        let result = analyze_stock("ADRO.JK", &candles);
        assert!(result.is_bullish);
        assert!(!result.is_accumulation);
    }

    #[test]
    fn test_stoch_crossover_in_uptrend() {
        let closes = zigzag_closes(100.0, 2.0, -1.0, 5, 0.5, 3.0);
        let candles = steady_series(&closes, 1_000_000);
        let frame = IndicatorFrame::from_candles(&candles);
        let last = frame.len() - 1;

        // %K 8.7 -> 18.9 against %D 12.5 -> 12.1
        assert!(frame.stoch.k[last - 1] < frame.stoch.d[last - 1]);
        assert!(frame.stoch.k[last] > frame.stoch.d[last]);
        assert!(!frame.stoch.k_cross_up[last - 1]);

        let result = analyze_stock("ANTM.JK", &candles);
        assert!(result.is_bullish);
        assert!(result.is_stoch_crossover);
        assert!(!result.is_accumulation);
        assert!((result.stoch_k - frame.stoch.k[last]).abs() < 1e-12);
    }

    #[test]
    fn test_stoch_crossover_suppressed_in_downtrend() {
        let closes = zigzag_closes(200.0, -1.0, 1.0, 2, 1.0, 3.0);
        let candles = steady_series(&closes, 1_000_000);
        let frame = IndicatorFrame::from_candles(&candles);
        let last = frame.len() - 1;

        assert!(frame.stoch.k_cross_up[last]);

        let result = analyze_stock("ANTM.JK", &candles);
        assert!(!result.is_bullish);
        assert!(!result.bullish_break);
        assert!(!result.is_stoch_crossover);
    }

    #[test]
    fn test_filter_signals_skips_illiquid() {
        let mut liquid_break = liquid("BBCA.JK");
        liquid_break.bullish_break = true;
        liquid_break.is_accumulation = true;

        let mut illiquid_break = ScanResult::new("ABCD.JK");
        illiquid_break.bullish_break = true;

        let results = vec![liquid_break, illiquid_break];
        let signals = filter_signals(&results);

        assert_eq!(signals.len(), 5);
        assert_eq!(signals[&SignalKind::BullishBreak].len(), 1);
        assert_eq!(signals[&SignalKind::BullishBreak][0].ticker, "BBCA.JK");
        assert_eq!(signals[&SignalKind::Accumulation].len(), 1);
        assert!(signals[&SignalKind::EarlyEntry].is_empty());
        assert!(has_any_signal(&signals));
        assert!(!has_any_signal(&empty_signal_map()));
    }

    #[test]
    fn test_current_signal_categories() {
        let mut strong = liquid("AAAA.JK");
        strong.is_bullish = true;
        strong.score = 70;
        strong.volume_ratio = 2.0;
        strong.is_early_entry = true;

        let mut acc = liquid("BBBB.JK");
        acc.is_bullish = true;
        acc.score = 50;
        acc.volume_ratio = 0.8;

        let mut acc_flag = liquid("CCCC.JK");
        acc_flag.is_accumulation = true;
        acc_flag.score = 65;

        let mut weak = liquid("DDDD.JK");
        weak.bearish_break = true;
        weak.score = 2;

        let results = vec![acc, strong, acc_flag, weak];
        let categories = filter_all_current_signals(&results);

        assert_eq!(categories.strong_buy.len(), 1);
        assert_eq!(categories.strong_buy[0].ticker, "AAAA.JK");
        assert_eq!(categories.accumulation.len(), 2);
        assert_eq!(categories.accumulation[0].ticker, "CCCC.JK");
        assert_eq!(categories.accumulation[1].ticker, "BBBB.JK");
        assert!(categories.bullish.is_empty());
        assert_eq!(categories.early_entry.len(), 1);
        assert_eq!(categories.bearish_watch.len(), 1);
        assert!(!categories.is_empty());
    }
}
