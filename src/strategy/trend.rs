//! Trend rules: EMA alignment, price vs EMA, MACD, ADX

use super::{ConfluenceEvaluator, Finding, Findings, IndicatorCluster};
use crate::features::IndicatorRow;
use crate::types::{Disposition, Horizon, Strength};

const ADX_TRENDING: f64 = 25.0;
const ADX_STRONG: f64 = 40.0;
const ADX_RANGING: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendEvaluator;

impl TrendEvaluator {
    fn ema_alignment(row: &IndicatorRow) -> Option<Finding> {
        let (fast, mid, slow) = (row.ema_fast, row.ema_mid, row.ema_slow);
        if fast > mid && mid > slow {
            Some(Finding::new(
                "EMA Alignment",
                IndicatorCluster::Trend,
                Disposition::Bullish,
                Strength::Strong,
                Horizon::MediumTerm,
                "EMA 9 > EMA 21 > EMA 50".to_string(),
                "Strong bullish trend structure. Expect continuation with pullbacks to EMAs as support.",
            ))
        } else if fast < mid && mid < slow {
            Some(Finding::new(
                "EMA Alignment",
                IndicatorCluster::Trend,
                Disposition::Bearish,
                Strength::Strong,
                Horizon::MediumTerm,
                "EMA 9 < EMA 21 < EMA 50".to_string(),
                "Strong bearish trend structure. Expect continuation with rallies to EMAs as resistance.",
            ))
        } else {
            None
        }
    }

    /// Always fires: price sits on one side of the mid EMA or the other
    fn price_vs_ema(row: &IndicatorRow) -> Finding {
        let distance = (row.close() / row.ema_mid - 1.0) * 100.0;
        if row.close() > row.ema_mid {
            Finding::new(
                "Price vs EMA 21",
                IndicatorCluster::Trend,
                Disposition::Bullish,
                Strength::Medium,
                Horizon::ShortToMediumTerm,
                format!("Price {distance:+.2}% above EMA 21"),
                "Bullish bias maintained. EMA 21 likely to act as dynamic support.",
            )
        } else {
            Finding::new(
                "Price vs EMA 21",
                IndicatorCluster::Trend,
                Disposition::Bearish,
                Strength::Medium,
                Horizon::ShortToMediumTerm,
                format!("Price {distance:+.2}% below EMA 21"),
                "Bearish bias maintained. EMA 21 likely to act as dynamic resistance.",
            )
        }
    }

    fn macd(row: &IndicatorRow) -> Option<Finding> {
        if row.macd > row.macd_signal && row.macd_hist > 0.0 {
            Some(Finding::new(
                "MACD",
                IndicatorCluster::Trend,
                Disposition::Bullish,
                Strength::Strong,
                Horizon::MediumTerm,
                "MACD above signal line with positive histogram".to_string(),
                "Bullish momentum building. Watch for histogram expansion for stronger moves.",
            ))
        } else if row.macd < row.macd_signal && row.macd_hist < 0.0 {
            Some(Finding::new(
                "MACD",
                IndicatorCluster::Trend,
                Disposition::Bearish,
                Strength::Strong,
                Horizon::MediumTerm,
                "MACD below signal line with negative histogram".to_string(),
                "Bearish momentum building. Watch for histogram expansion for stronger moves.",
            ))
        } else {
            None
        }
    }

    fn adx(row: &IndicatorRow) -> Option<Finding> {
        let adx = row.adx;
        if adx > ADX_TRENDING {
            let direction = if row.plus_di > row.minus_di {
                Disposition::Bullish
            } else {
                Disposition::Bearish
            };
            let strength = if adx > ADX_STRONG {
                Strength::Strong
            } else {
                Strength::Medium
            };
            Some(Finding::new(
                "ADX Trend Strength",
                IndicatorCluster::Trend,
                direction,
                strength,
                Horizon::MediumToLongTerm,
                format!("Strong trending market (ADX: {adx:.1})"),
                format!(
                    "Strong {direction} trend in place. Expect trend continuation with minor pullbacks."
                ),
            ))
        } else if adx < ADX_RANGING {
            Some(Finding::new(
                "ADX Trend Strength",
                IndicatorCluster::Trend,
                Disposition::Neutral,
                Strength::Medium,
                Horizon::AllTimeframes,
                format!("Weak trending market (ADX: {adx:.1})"),
                "Market in consolidation/ranging phase. Look for breakout setups.",
            ))
        } else {
            None
        }
    }
}

impl ConfluenceEvaluator for TrendEvaluator {
    fn cluster(&self) -> IndicatorCluster {
        IndicatorCluster::Trend
    }

    fn evaluate(&self, row: &IndicatorRow) -> Findings {
        let mut findings = Findings::default();
        if let Some(f) = Self::ema_alignment(row) {
            findings.push(f);
        }
        findings.push(Self::price_vs_ema(row));
        if let Some(f) = Self::macd(row) {
            findings.push(f);
        }
        if let Some(f) = Self::adx(row) {
            findings.push(f);
        }
        findings
    }
}
