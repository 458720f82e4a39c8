//! Whole-series helpers shared by the indicator families
//!
//! Every helper returns one slot per input bar; `None` marks bars where the
//! window is not yet full or the value is undefined (e.g. a zero divisor).

/// Apply `f` over every full trailing window of `period` values
fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = Some(f(window));
    }
    out
}

/// Simple moving average
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Simple moving average over a partially defined series.
/// A window touching any `None` yields `None`.
pub fn sma_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        let sum: Option<f64> = window.iter().copied().sum();
        out[i + period - 1] = sum.map(|s| s / period as f64);
    }
    out
}

/// Trailing window sum
pub fn rolling_sum(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().sum())
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().fold(f64::MIN, f64::max))
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().fold(f64::MAX, f64::min))
}

/// Population standard deviation (ddof = 0)
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let variance = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    })
}

/// Recursive exponential average `avg += alpha * (x - avg)`.
///
/// Seeded with the first defined value; emits once `min_periods` defined
/// values have been observed. Undefined inputs after the seed emit `None`
/// and leave the running average untouched.
pub fn ewm(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut avg: Option<f64> = None;
    let mut seen = 0usize;

    for value in values {
        let Some(x) = *value else {
            out.push(None);
            continue;
        };
        let next = match avg {
            None => x,
            Some(prev) => prev + alpha * (x - prev),
        };
        avg = Some(next);
        seen += 1;
        out.push(if seen >= min_periods.max(1) { Some(next) } else { None });
    }
    out
}

/// Exponential moving average with span `period` (alpha = 2 / (period + 1))
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let defined: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_defined(&defined, period)
}

/// EMA over a series with leading gaps, seeded at its first defined value
pub fn ema_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    ewm(values, 2.0 / (period as f64 + 1.0), period)
}

/// Wilder average (alpha = 1 / period)
pub fn wilder(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    ewm(values, 1.0 / period as f64, period)
}

/// `a / b`, undefined when either side is undefined or the divisor is zero
pub fn ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) if b != 0.0 => Some(a / b),
        _ => None,
    }
}
