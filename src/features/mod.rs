//! Indicator Engine - Technical indicators over a candle history
//!
//! Computes one enriched row per candle:
//! - Momentum: RSI (fast/slow), Stochastic %K/%D, Williams %R
//! - Trend: EMA (fast/mid/slow), SMA (fast/slow), MACD, ADX with +DI/-DI
//! - Volatility: Bollinger Bands (+ width%, position), Keltner Channel, ATR, ATR%
//! - Volume: volume SMA and ratio, OBV, Chaikin Money Flow
//! - Price action: body, wicks, range (% of open)
//! - Levels: pivot, R1, S1
//! - Rate of change (fast/slow)
//!
//! Rows inside the longest lookback window, or with any undefined or
//! non-finite value, are dropped rather than emitted partially.

pub mod momentum;
pub mod series;
pub mod trend;
pub mod volatility;
pub mod volume;

use serde::Serialize;

use crate::config::IndicatorConfig;
use crate::types::Candle;
use series::{ema, ratio, sma};

/// One candle plus every derived indicator value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub candle: Candle,

    // Momentum
    pub rsi_fast: f64,
    pub rsi_slow: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub williams_r: f64,

    // Trend
    pub ema_fast: f64,
    pub ema_mid: f64,
    pub ema_slow: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,

    // Volatility
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    /// (upper - lower) / middle * 100
    pub bb_width: f64,
    /// (close - lower) / (upper - lower)
    pub bb_position: f64,
    pub kc_upper: f64,
    pub kc_middle: f64,
    pub kc_lower: f64,
    pub atr: f64,
    /// ATR as % of close
    pub atr_pct: f64,

    // Volume
    pub volume_sma: f64,
    pub volume_ratio: f64,
    pub obv: f64,
    pub cmf: f64,

    // Price action (% of open)
    pub body_size: f64,
    pub upper_wick: f64,
    pub lower_wick: f64,
    pub total_range: f64,

    // Levels
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,

    pub roc_fast: f64,
    pub roc_slow: f64,
}

impl IndicatorRow {
    pub fn close(&self) -> f64 {
        self.candle.close
    }

    fn values(&self) -> [f64; 39] {
        [
            self.rsi_fast,
            self.rsi_slow,
            self.stoch_k,
            self.stoch_d,
            self.williams_r,
            self.ema_fast,
            self.ema_mid,
            self.ema_slow,
            self.sma_fast,
            self.sma_slow,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.adx,
            self.plus_di,
            self.minus_di,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.bb_width,
            self.bb_position,
            self.kc_upper,
            self.kc_middle,
            self.kc_lower,
            self.atr,
            self.atr_pct,
            self.volume_sma,
            self.volume_ratio,
            self.obv,
            self.cmf,
            self.body_size,
            self.upper_wick,
            self.lower_wick,
            self.total_range,
            self.pivot,
            self.r1,
            self.s1,
            self.roc_fast,
            self.roc_slow,
        ]
    }

    /// Every derived value is a finite number
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

/// Pure, deterministic indicator engine
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Fewest candles that can yield at least one row
    pub fn min_candles(&self) -> usize {
        self.config.max_lookback()
    }

    /// Enrich a chronological candle sequence.
    ///
    /// Uses only current and past bars for each row. The output is never
    /// longer than the input, and calling it twice on the same input yields
    /// identical rows.
    pub fn enrich(&self, candles: &[Candle]) -> Vec<IndicatorRow> {
        let cfg = &self.config;
        let open: Vec<f64> = candles.iter().map(|c| c.open).collect();
        let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let vol: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        // Momentum
        let rsi_fast = momentum::rsi(&close, cfg.rsi_fast);
        let rsi_slow = momentum::rsi(&close, cfg.rsi_slow);
        let (stoch_k, stoch_d) =
            momentum::stochastic(&high, &low, &close, cfg.stoch_window, cfg.stoch_smooth);
        let williams = momentum::williams_r(&high, &low, &close, cfg.williams_window);

        // Trend
        let ema_fast = ema(&close, cfg.ema_fast);
        let ema_mid = ema(&close, cfg.ema_mid);
        let ema_slow = ema(&close, cfg.ema_slow);
        let sma_fast = sma(&close, cfg.sma_fast);
        let sma_slow = sma(&close, cfg.sma_slow);
        let macd = trend::macd(&close, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let adx = trend::adx(&high, &low, &close, cfg.adx_period);

        // Volatility
        let bb = volatility::bollinger(&close, cfg.bb_period, cfg.bb_std_dev);
        let kc = volatility::keltner(&high, &low, &close, cfg.keltner_period);
        let atr = volatility::atr(&high, &low, &close, cfg.atr_period);

        // Volume
        let volume_sma = sma(&vol, cfg.volume_sma_period);
        let obv = volume::obv(&close, &vol);
        let cmf = volume::cmf(&high, &low, &close, &vol, cfg.cmf_period);

        let roc = |i: usize, period: usize| -> Option<f64> {
            let past = *close.get(i.checked_sub(period)?)?;
            ratio(Some(close[i]), Some(past)).map(|r| (r - 1.0) * 100.0)
        };

        let row_at = |i: usize| -> Option<IndicatorRow> {
            let c = close[i];
            let (o, h, l) = (open[i], high[i], low[i]);

            let bb_upper = bb.upper[i]?;
            let bb_middle = bb.middle[i]?;
            let bb_lower = bb.lower[i]?;
            let atr_value = atr[i]?;
            let pivot = (h + l + c) / 3.0;

            Some(IndicatorRow {
                candle: candles[i],
                rsi_fast: rsi_fast[i]?,
                rsi_slow: rsi_slow[i]?,
                stoch_k: stoch_k[i]?,
                stoch_d: stoch_d[i]?,
                williams_r: williams[i]?,
                ema_fast: ema_fast[i]?,
                ema_mid: ema_mid[i]?,
                ema_slow: ema_slow[i]?,
                sma_fast: sma_fast[i]?,
                sma_slow: sma_slow[i]?,
                macd: macd.line[i]?,
                macd_signal: macd.signal[i]?,
                macd_hist: macd.histogram[i]?,
                adx: adx.adx[i]?,
                plus_di: adx.plus_di[i]?,
                minus_di: adx.minus_di[i]?,
                bb_upper,
                bb_middle,
                bb_lower,
                bb_width: ratio(Some(bb_upper - bb_lower), Some(bb_middle))? * 100.0,
                bb_position: ratio(Some(c - bb_lower), Some(bb_upper - bb_lower))?,
                kc_upper: kc.upper[i]?,
                kc_middle: kc.middle[i]?,
                kc_lower: kc.lower[i]?,
                atr: atr_value,
                atr_pct: ratio(Some(atr_value), Some(c))? * 100.0,
                volume_sma: volume_sma[i]?,
                volume_ratio: ratio(Some(vol[i]), volume_sma[i])?,
                obv: obv[i]?,
                cmf: cmf[i]?,
                body_size: ratio(Some((c - o).abs()), Some(o))? * 100.0,
                upper_wick: ratio(Some(h - o.max(c)), Some(o))? * 100.0,
                lower_wick: ratio(Some(o.min(c) - l), Some(o))? * 100.0,
                total_range: ratio(Some(h - l), Some(o))? * 100.0,
                pivot,
                r1: 2.0 * pivot - l,
                s1: 2.0 * pivot - h,
                roc_fast: roc(i, cfg.roc_fast)?,
                roc_slow: roc(i, cfg.roc_slow)?,
            })
        };

        let first = cfg.max_lookback().saturating_sub(1);
        let rows: Vec<IndicatorRow> = (first..candles.len())
            .filter_map(row_at)
            .filter(IndicatorRow::is_finite)
            .collect();

        tracing::debug!(
            candles = candles.len(),
            lookback = first,
            rows = rows.len(),
            dropped = candles.len() - rows.len(),
            "Indicator rows computed"
        );

        rows
    }
}
