//! Trend indicators: MACD and ADX with directional indices

use super::series::{ema, ema_defined};

/// MACD line, signal line and histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD = EMA(fast) - EMA(slow); signal = EMA(signal) of the line,
/// seeded at the first bar where the line is defined
pub fn macd(close: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_defined(&line, signal);
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

/// ADX with +DI / -DI
#[derive(Debug, Clone, PartialEq)]
pub struct Adx {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

/// Wilder ADX.
///
/// Bar 0 only seeds the previous high/low/close. +DM, -DM and TR are summed
/// over the next `period` bars, after which the sums are Wilder-smoothed
/// (`s = s - s / n + x`) and the DIs are defined. ADX is the mean of the first
/// `period` DX values and is Wilder-smoothed from there.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Adx {
    let len = close.len();
    let mut out = Adx {
        adx: vec![None; len],
        plus_di: vec![None; len],
        minus_di: vec![None; len],
    };
    if period == 0 || len == 0 {
        return out;
    }

    let n = period as f64;
    let (mut plus_dm_s, mut minus_dm_s, mut tr_s) = (0.0, 0.0, 0.0);
    let mut dx_sum = 0.0;
    let mut dx_count = 0usize;
    let mut adx_value: Option<f64> = None;

    for i in 1..len {
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        let tr = (high[i] - low[i])
            .max((high[i] - close[i - 1]).abs())
            .max((low[i] - close[i - 1]).abs());

        if i <= period {
            plus_dm_s += plus_dm;
            minus_dm_s += minus_dm;
            tr_s += tr;
            if i < period {
                continue;
            }
        } else {
            plus_dm_s = plus_dm_s - plus_dm_s / n + plus_dm;
            minus_dm_s = minus_dm_s - minus_dm_s / n + minus_dm;
            tr_s = tr_s - tr_s / n + tr;
        }

        if tr_s <= 0.0 {
            continue;
        }
        let plus_di = plus_dm_s / tr_s * 100.0;
        let minus_di = minus_dm_s / tr_s * 100.0;
        out.plus_di[i] = Some(plus_di);
        out.minus_di[i] = Some(minus_di);

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            (plus_di - minus_di).abs() / di_sum * 100.0
        } else {
            0.0
        };

        adx_value = match adx_value {
            Some(prev) => Some((prev * (n - 1.0) + dx) / n),
            None => {
                dx_sum += dx;
                dx_count += 1;
                (dx_count >= period).then(|| dx_sum / n)
            }
        };
        out.adx[i] = adx_value;
    }

    out
}
