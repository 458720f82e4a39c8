//! Confluence rule evaluators
//!
//! Each evaluator inspects the latest indicator row against fixed thresholds
//! and emits findings grouped by disposition. Within one indicator family the
//! conditions form a single ordered chain, so a family yields at most one
//! finding per row.

mod momentum;
mod trend;
mod volatility;
mod volume;

pub use momentum::MomentumEvaluator;
pub use trend::TrendEvaluator;
pub use volatility::VolatilityEvaluator;
pub use volume::VolumeEvaluator;

use serde::Serialize;
use std::fmt;

use crate::features::IndicatorRow;
use crate::types::{Disposition, Horizon, Strength};

/// Cluster types for indicator grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCluster {
    Momentum,   // RSI, Stochastic, Williams %R
    Trend,      // EMA, MACD, ADX
    Volatility, // Bollinger, ATR
    Volume,     // Volume ratio, CMF
}

impl fmt::Display for IndicatorCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorCluster::Momentum => write!(f, "momentum"),
            IndicatorCluster::Trend => write!(f, "trend"),
            IndicatorCluster::Volatility => write!(f, "volatility"),
            IndicatorCluster::Volume => write!(f, "volume"),
        }
    }
}

/// A single triggered rule with its rendered rationale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub indicator: String,
    pub cluster: IndicatorCluster,
    pub disposition: Disposition,
    /// Observation with the literal current values
    pub condition: String,
    /// Trading interpretation
    pub implication: String,
    pub strength: Strength,
    pub timeframe: Horizon,
}

impl Finding {
    pub fn new(
        indicator: &str,
        cluster: IndicatorCluster,
        disposition: Disposition,
        strength: Strength,
        timeframe: Horizon,
        condition: String,
        implication: impl Into<String>,
    ) -> Self {
        Self {
            indicator: indicator.to_string(),
            cluster,
            disposition,
            condition,
            implication: implication.into(),
            strength,
            timeframe,
        }
    }
}

/// Findings grouped by disposition, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Findings {
    pub bullish: Vec<Finding>,
    pub bearish: Vec<Finding>,
    pub neutral: Vec<Finding>,
}

impl Findings {
    /// Route a finding to the list matching its disposition
    pub fn push(&mut self, finding: Finding) {
        match finding.disposition {
            Disposition::Bullish => self.bullish.push(finding),
            Disposition::Bearish => self.bearish.push(finding),
            Disposition::Neutral => self.neutral.push(finding),
        }
    }

    /// Append `other` after the findings already held
    pub fn merge(&mut self, other: Findings) {
        self.bullish.extend(other.bullish);
        self.bearish.extend(other.bearish);
        self.neutral.extend(other.neutral);
    }

    pub fn len(&self) -> usize {
        self.bullish.len() + self.bearish.len() + self.neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.bullish
            .iter()
            .chain(self.bearish.iter())
            .chain(self.neutral.iter())
    }
}

/// Stateless rule set over one indicator row
pub trait ConfluenceEvaluator: Send + Sync {
    fn cluster(&self) -> IndicatorCluster;

    fn evaluate(&self, row: &IndicatorRow) -> Findings;
}

/// Momentum, trend, volatility and volume evaluators, in report order
pub fn default_evaluators() -> Vec<Box<dyn ConfluenceEvaluator>> {
    vec![
        Box::new(MomentumEvaluator),
        Box::new(TrendEvaluator),
        Box::new(VolatilityEvaluator),
        Box::new(VolumeEvaluator),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::features::IndicatorRow;
    use crate::types::Candle;

    /// A quiet row: only the price-vs-EMA rule fires
    pub fn neutral_row() -> IndicatorRow {
        IndicatorRow {
            candle: Candle {
                open_time: 1_700_000_000_000,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000.0,
            },
            rsi_fast: 60.0,
            rsi_slow: 58.0,
            stoch_k: 50.0,
            stoch_d: 50.0,
            williams_r: -50.0,
            ema_fast: 100.0,
            ema_mid: 100.0,
            ema_slow: 100.0,
            sma_fast: 100.0,
            sma_slow: 100.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            adx: 22.0,
            plus_di: 20.0,
            minus_di: 20.0,
            bb_upper: 102.0,
            bb_middle: 100.0,
            bb_lower: 98.0,
            bb_width: 4.0,
            bb_position: 0.5,
            kc_upper: 102.0,
            kc_middle: 100.0,
            kc_lower: 98.0,
            atr: 2.0,
            atr_pct: 2.0,
            volume_sma: 1000.0,
            volume_ratio: 1.0,
            obv: 10_000.0,
            cmf: 0.0,
            body_size: 0.0,
            upper_wick: 1.0,
            lower_wick: 1.0,
            total_range: 2.0,
            pivot: 100.0,
            r1: 101.0,
            s1: 99.0,
            roc_fast: 0.0,
            roc_slow: 0.0,
        }
    }
}
