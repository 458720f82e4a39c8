//! Volatility indicators: Bollinger Bands, Keltner Channel, ATR

use super::series::{rolling_std, sma};

/// Upper / middle / lower band triple
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bollinger Bands: SMA +/- `std_dev` population standard deviations
pub fn bollinger(close: &[f64], period: usize, std_dev: f64) -> Bands {
    let middle = sma(close, period);
    let std = rolling_std(close, period);

    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| Some((*m)? + std_dev * (*s)?))
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| Some((*m)? - std_dev * (*s)?))
        .collect();

    Bands {
        upper,
        middle,
        lower,
    }
}

/// Keltner Channel, typical-price variant: each band is an SMA of its own
/// per-bar anchor
pub fn keltner(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Bands {
    let anchors = |f: fn(f64, f64, f64) -> f64| -> Vec<f64> {
        (0..close.len())
            .map(|i| f(high[i], low[i], close[i]))
            .collect()
    };

    let middle = anchors(|h, l, c| (h + l + c) / 3.0);
    let upper = anchors(|h, l, c| (4.0 * h - 2.0 * l + c) / 3.0);
    let lower = anchors(|h, l, c| (-2.0 * h + 4.0 * l + c) / 3.0);

    Bands {
        upper: sma(&upper, period),
        middle: sma(&middle, period),
        lower: sma(&lower, period),
    }
}

/// True range; the first bar has no previous close and uses high - low
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if i == 0 {
                return range;
            }
            let prev_close = close[i - 1];
            range
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs())
        })
        .collect()
}

/// Average True Range: mean of the first `period` TRs, then Wilder smoothing
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    let tr = true_range(high, low, close);
    let mut out = vec![None; tr.len()];
    if period == 0 || tr.len() < period {
        return out;
    }

    let n = period as f64;
    let mut value = tr[..period].iter().sum::<f64>() / n;
    out[period - 1] = Some(value);
    for i in period..tr.len() {
        value = (value * (n - 1.0) + tr[i]) / n;
        out[i] = Some(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_population_std() {
        let close = [1.0, 3.0, 1.0, 3.0];
        let bands = bollinger(&close, 4, 2.0);
        // mean 2, population std 1
        assert_eq!(bands.middle[3], Some(2.0));
        assert_eq!(bands.upper[3], Some(4.0));
        assert_eq!(bands.lower[3], Some(0.0));
        assert_eq!(bands.upper[2], None);
    }

    #[test]
    fn test_keltner_bands_bracket_middle() {
        let high = [11.0, 12.0, 13.0];
        let low = [9.0, 10.0, 11.0];
        let close = [10.0, 11.0, 12.0];
        let kc = keltner(&high, &low, &close, 3);

        assert!((kc.middle[2].unwrap() - 11.0).abs() < 1e-9);
        // (4H - 2L + C) / 3 averages to (48 - 20 + 11) / 3 = 13
        assert!((kc.upper[2].unwrap() - 13.0).abs() < 1e-9);
        // (-2H + 4L + C) / 3 averages to (-24 + 40 + 11) / 3 = 9
        assert!((kc.lower[2].unwrap() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_true_range_uses_gap() {
        let tr = true_range(&[10.0, 15.0], &[8.0, 13.0], &[9.0, 14.0]);
        assert_eq!(tr, vec![2.0, 6.0]);
    }

    #[test]
    fn test_atr_seed_then_wilder() {
        let high = [10.0, 11.0, 12.0, 20.0];
        let low = [8.0, 10.0, 11.0, 12.0];
        let close = [9.0, 10.5, 11.5, 19.0];
        // TR: 2, 2, 1.5, 8.5
        let out = atr(&high, &low, &close, 3);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 5.5 / 3.0).abs() < 1e-9);
        assert!((out[3].unwrap() - (5.5 / 3.0 * 2.0 + 8.5) / 3.0).abs() < 1e-9);
    }
}
