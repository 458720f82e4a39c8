//! Momentum oscillators: RSI, Stochastic, Williams %R

use super::series::{rolling_max, rolling_min, sma_defined, wilder};

/// RSI with Wilder smoothing of gains and losses.
///
/// The smoothing is seeded with the first close-to-close change and becomes
/// defined after `period` changes. A zero average loss reads as 100.
pub fn rsi(close: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = vec![None; close.len()];
    let mut losses = vec![None; close.len()];
    for i in 1..close.len() {
        let change = close[i] - close[i - 1];
        gains[i] = Some(change.max(0.0));
        losses[i] = Some((-change).max(0.0));
    }

    let avg_gain = wilder(&gains, period);
    let avg_loss = wilder(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect()
}

/// Stochastic oscillator: (%K, %D)
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    window: usize,
    smooth: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let highest = rolling_max(high, window);
    let lowest = rolling_min(low, window);

    let k: Vec<Option<f64>> = close
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let (hh, ll) = (highest[i]?, lowest[i]?);
            let range = hh - ll;
            if range == 0.0 {
                return None;
            }
            Some(100.0 * (c - ll) / range)
        })
        .collect();

    let d = sma_defined(&k, smooth);
    (k, d)
}

/// Williams %R in [-100, 0]
pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<Option<f64>> {
    let highest = rolling_max(high, window);
    let lowest = rolling_min(low, window);

    close
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let (hh, ll) = (highest[i]?, lowest[i]?);
            let range = hh - ll;
            if range == 0.0 {
                return None;
            }
            Some(-100.0 * (hh - c) / range)
        })
        .collect()
}
