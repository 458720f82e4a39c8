//! Volume indicators: OBV and Chaikin Money Flow

use super::series::{ratio, rolling_sum};

/// On-Balance Volume. A close below the previous close subtracts the bar's
/// volume; anything else (including the first bar) adds it.
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    close
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i > 0 && *c < close[i - 1] {
                total -= volume[i];
            } else {
                total += volume[i];
            }
            Some(total)
        })
        .collect()
}

/// Chaikin Money Flow over `period` bars. Zero-range bars contribute no
/// money flow; a window with zero total volume is undefined.
pub fn cmf(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    let money_flow: Vec<f64> = (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if range == 0.0 {
                return 0.0;
            }
            let multiplier = ((close[i] - low[i]) - (high[i] - close[i])) / range;
            multiplier * volume[i]
        })
        .collect();

    let flow_sum = rolling_sum(&money_flow, period);
    let volume_sum = rolling_sum(volume, period);

    flow_sum
        .iter()
        .zip(&volume_sum)
        .map(|(f, v)| ratio(*f, *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv_accumulates_by_direction() {
        let close = [10.0, 11.0, 11.0, 9.0];
        let volume = [100.0, 50.0, 20.0, 30.0];
        let out = obv(&close, &volume);
        assert_eq!(
            out,
            vec![Some(100.0), Some(150.0), Some(170.0), Some(140.0)]
        );
    }

    #[test]
    fn test_cmf_close_at_high_is_full_buying() {
        let high = [10.0, 12.0];
        let low = [8.0, 10.0];
        let close = [10.0, 12.0];
        let out = cmf(&high, &low, &close, &[5.0, 5.0], 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(1.0));
    }

    #[test]
    fn test_cmf_zero_range_and_zero_volume() {
        let flat = [10.0, 10.0];
        let out = cmf(&flat, &flat, &flat, &[5.0, 5.0], 2);
        assert_eq!(out[1], Some(0.0));

        let out = cmf(&[11.0, 11.0], &[9.0, 9.0], &[10.0, 10.0], &[0.0, 0.0], 2);
        assert_eq!(out[1], None);
    }
}
