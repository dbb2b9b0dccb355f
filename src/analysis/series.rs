//! Series math primitives
//!
//! Every function here maps one or more aligned input columns to an output
//! column of the same length. Rolling windows of period `P` leave the first
//! `P - 1` rows as `f64::NAN`, and any window that contains a NaN is itself
//! NaN. Callers must read NaN as "not yet available", never as zero.

/// Exponential moving average with smoothing factor `2 / (period + 1)`.
///
/// Seeded by the first value, so there is no warm-up window and every row is
/// defined.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() || period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[0];
    out.push(prev);

    for &value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }

    out
}

/// Apply `reduce` over each full trailing window of `period` rows.
fn rolling<F>(values: &[f64], period: usize, reduce: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = reduce(window);
    }

    out
}

/// Simple rolling mean over `period` rows.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling maximum over `period` rows.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Rolling minimum over `period` rows.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Row-over-row difference. Row 0 is NaN.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] - values[i - 1];
    }
    out
}

/// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
///
/// Row 0 has no previous close and falls back to `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    let mut out = Vec::with_capacity(len);

    for i in 0..len {
        let hl = high[i] - low[i];
        if i == 0 {
            out.push(hl);
            continue;
        }
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        out.push(hl.max(hc).max(lc));
    }

    out
}

/// Rate of change in percent: `(v[i] - v[i - period]) / v[i - period] * 100`.
pub fn rate_of_change(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    for i in period..values.len() {
        let base = values[i - period];
        out[i] = (values[i] - base) / base * 100.0;
    }

    out
}

/// Strict upward crossing of `a` over `b`: `a <= b` on the prior row and
/// `a > b` on the current row. Row 0 is always false and NaN never crosses.
pub fn crossover(a: &[f64], b: &[f64]) -> Vec<bool> {
    let len = a.len().min(b.len());
    let mut out = vec![false; len];
    for i in 1..len {
        out[i] = a[i - 1] <= b[i - 1] && a[i] > b[i];
    }
    out
}

/// Mirror of [`crossover`]: `a >= b` on the prior row and `a < b` now.
pub fn crossunder(a: &[f64], b: &[f64]) -> Vec<bool> {
    let len = a.len().min(b.len());
    let mut out = vec![false; len];
    for i in 1..len {
        out[i] = a[i - 1] >= b[i - 1] && a[i] < b[i];
    }
    out
}
