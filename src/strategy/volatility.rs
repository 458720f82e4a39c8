//! Volatility rules: Bollinger position, ATR%

use super::{ConfluenceEvaluator, Finding, Findings, IndicatorCluster};
use crate::features::IndicatorRow;
use crate::types::{Disposition, Horizon, Strength};

const BB_LOWER_ZONE: f64 = 0.2;
const BB_UPPER_ZONE: f64 = 0.8;
const ATR_HIGH_PCT: f64 = 5.0;
const ATR_LOW_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityEvaluator;

impl ConfluenceEvaluator for VolatilityEvaluator {
    fn cluster(&self) -> IndicatorCluster {
        IndicatorCluster::Volatility
    }

    fn evaluate(&self, row: &IndicatorRow) -> Findings {
        let mut findings = Findings::default();

        let position = row.bb_position;
        if position < BB_LOWER_ZONE {
            findings.push(Finding::new(
                "Bollinger Bands",
                IndicatorCluster::Volatility,
                Disposition::Bullish,
                Strength::Medium,
                Horizon::ShortTerm,
                format!("Price near lower band (Position: {position:.2})"),
                "Potential oversold bounce. Watch for move back toward middle band.",
            ));
        } else if position > BB_UPPER_ZONE {
            findings.push(Finding::new(
                "Bollinger Bands",
                IndicatorCluster::Volatility,
                Disposition::Bearish,
                Strength::Medium,
                Horizon::ShortTerm,
                format!("Price near upper band (Position: {position:.2})"),
                "Potential overbought pullback. Watch for move back toward middle band.",
            ));
        }

        let atr_pct = row.atr_pct;
        if atr_pct > ATR_HIGH_PCT {
            findings.push(Finding::new(
                "ATR",
                IndicatorCluster::Volatility,
                Disposition::Neutral,
                Strength::Medium,
                Horizon::AllTimeframes,
                format!("High volatility ({atr_pct:.2}%)"),
                "Elevated volatility suggests increased risk/reward. Use wider stops.",
            ));
        } else if atr_pct < ATR_LOW_PCT {
            findings.push(Finding::new(
                "ATR",
                IndicatorCluster::Volatility,
                Disposition::Neutral,
                Strength::Medium,
                Horizon::AllTimeframes,
                format!("Low volatility ({atr_pct:.2}%)"),
                "Low volatility suggests potential for breakout. Watch for expansion.",
            ));
        }

        findings
    }
}
