//! Momentum rules: RSI, Stochastic, Williams %R

use super::{ConfluenceEvaluator, Finding, Findings, IndicatorCluster};
use crate::features::IndicatorRow;
use crate::types::{Disposition, Horizon, Strength};

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_NEUTRAL_BAND: (f64, f64) = (45.0, 55.0);
const STOCH_OVERSOLD: f64 = 20.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const WILLIAMS_OVERSOLD: f64 = -80.0;
const WILLIAMS_OVERBOUGHT: f64 = -20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumEvaluator;

impl MomentumEvaluator {
    fn finding(
        indicator: &str,
        disposition: Disposition,
        strength: Strength,
        condition: String,
        implication: &str,
    ) -> Finding {
        Finding::new(
            indicator,
            IndicatorCluster::Momentum,
            disposition,
            strength,
            Horizon::ShortTerm,
            condition,
            implication,
        )
    }

    fn rsi(row: &IndicatorRow) -> Option<Finding> {
        let rsi = row.rsi_fast;
        if rsi < RSI_OVERSOLD {
            Some(Self::finding(
                "RSI (14)",
                Disposition::Bullish,
                Strength::Medium,
                format!("Oversold at {rsi:.1}"),
                "Potential bounce or reversal setup. Watch for bullish divergence or break above 30.",
            ))
        } else if rsi > RSI_OVERBOUGHT {
            Some(Self::finding(
                "RSI (14)",
                Disposition::Bearish,
                Strength::Medium,
                format!("Overbought at {rsi:.1}"),
                "Potential pullback or distribution. Watch for bearish divergence or break below 70.",
            ))
        } else if (RSI_NEUTRAL_BAND.0..=RSI_NEUTRAL_BAND.1).contains(&rsi) {
            Some(Self::finding(
                "RSI (14)",
                Disposition::Neutral,
                Strength::Low,
                format!("Neutral at {rsi:.1}"),
                "Balanced momentum. Look for directional break above 55 or below 45.",
            ))
        } else {
            None
        }
    }

    fn stochastic(row: &IndicatorRow) -> Option<Finding> {
        let (k, d) = (row.stoch_k, row.stoch_d);
        if k < STOCH_OVERSOLD && d < STOCH_OVERSOLD {
            // %K already turning up through %D
            let strength = if k > d {
                Strength::Strong
            } else {
                Strength::Medium
            };
            Some(Self::finding(
                "Stochastic",
                Disposition::Bullish,
                strength,
                format!("Both %K ({k:.1}) and %D ({d:.1}) oversold"),
                "Strong oversold condition. Potential reversal when %K crosses above %D.",
            ))
        } else if k > STOCH_OVERBOUGHT && d > STOCH_OVERBOUGHT {
            let strength = if k < d {
                Strength::Strong
            } else {
                Strength::Medium
            };
            Some(Self::finding(
                "Stochastic",
                Disposition::Bearish,
                strength,
                format!("Both %K ({k:.1}) and %D ({d:.1}) overbought"),
                "Strong overbought condition. Potential reversal when %K crosses below %D.",
            ))
        } else {
            None
        }
    }

    fn williams(row: &IndicatorRow) -> Option<Finding> {
        let wr = row.williams_r;
        if wr < WILLIAMS_OVERSOLD {
            Some(Self::finding(
                "Williams %R",
                Disposition::Bullish,
                Strength::Medium,
                format!("Oversold at {wr:.1}"),
                "Potential buying opportunity. Watch for move above -80 for confirmation.",
            ))
        } else if wr > WILLIAMS_OVERBOUGHT {
            Some(Self::finding(
                "Williams %R",
                Disposition::Bearish,
                Strength::Medium,
                format!("Overbought at {wr:.1}"),
                "Potential selling pressure. Watch for move below -20 for confirmation.",
            ))
        } else {
            None
        }
    }
}

impl ConfluenceEvaluator for MomentumEvaluator {
    fn cluster(&self) -> IndicatorCluster {
        IndicatorCluster::Momentum
    }

    fn evaluate(&self, row: &IndicatorRow) -> Findings {
        let mut findings = Findings::default();
        for finding in [Self::rsi(row), Self::stochastic(row), Self::williams(row)]
            .into_iter()
            .flatten()
        {
            findings.push(finding);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::neutral_row;

    fn with_rsi(rsi: f64) -> IndicatorRow {
        IndicatorRow {
            rsi_fast: rsi,
            ..neutral_row()
        }
    }

    #[test]
    fn test_rsi_oversold_boundary_is_strict() {
        let at_boundary = MomentumEvaluator.evaluate(&with_rsi(30.0));
        assert!(at_boundary.bullish.is_empty());

        let below = MomentumEvaluator.evaluate(&with_rsi(29.999));
        assert_eq!(below.bullish.len(), 1);
        assert_eq!(below.bullish[0].indicator, "RSI (14)");
        assert_eq!(below.bullish[0].condition, "Oversold at 30.0");
        assert_eq!(below.bullish[0].strength, Strength::Medium);
    }

    #[test]
    fn test_rsi_overbought_and_neutral_band() {
        let hot = MomentumEvaluator.evaluate(&with_rsi(75.26));
        assert_eq!(hot.bearish[0].condition, "Overbought at 75.3");

        let mid = MomentumEvaluator.evaluate(&with_rsi(45.0));
        assert_eq!(mid.neutral.len(), 1);
        assert_eq!(mid.neutral[0].strength, Strength::Low);
        assert_eq!(mid.neutral[0].condition, "Neutral at 45.0");

        // between the neutral band and the extremes nothing fires
        assert!(MomentumEvaluator.evaluate(&with_rsi(40.0)).is_empty());
    }

    #[test]
    fn test_rsi_family_emits_at_most_one_finding() {
        for rsi in [0.0, 10.0, 29.999, 30.0, 45.0, 50.0, 55.0, 70.0, 70.001, 100.0] {
            let findings = MomentumEvaluator.evaluate(&with_rsi(rsi));
            let rsi_findings = findings
                .iter()
                .filter(|f| f.indicator == "RSI (14)")
                .count();
            assert!(rsi_findings <= 1, "rsi {rsi} produced {rsi_findings}");
            assert!(!(findings.bullish.len() == 1 && findings.neutral.len() == 1));
        }
    }

    #[test]
    fn test_stochastic_strength_depends_on_cross() {
        let turning_up = IndicatorRow {
            stoch_k: 15.0,
            stoch_d: 12.0,
            ..neutral_row()
        };
        let findings = MomentumEvaluator.evaluate(&turning_up);
        assert_eq!(findings.bullish[0].strength, Strength::Strong);
        assert_eq!(
            findings.bullish[0].condition,
            "Both %K (15.0) and %D (12.0) oversold"
        );

        let still_falling = IndicatorRow {
            stoch_k: 10.0,
            stoch_d: 12.0,
            ..neutral_row()
        };
        assert_eq!(
            MomentumEvaluator.evaluate(&still_falling).bullish[0].strength,
            Strength::Medium
        );

        let overbought = IndicatorRow {
            stoch_k: 85.0,
            stoch_d: 90.0,
            ..neutral_row()
        };
        assert_eq!(
            MomentumEvaluator.evaluate(&overbought).bearish[0].strength,
            Strength::Strong
        );
    }

    #[test]
    fn test_stochastic_requires_both_lines() {
        let split = IndicatorRow {
            stoch_k: 15.0,
            stoch_d: 25.0,
            ..neutral_row()
        };
        assert!(MomentumEvaluator.evaluate(&split).is_empty());
    }

    #[test]
    fn test_williams_thresholds() {
        let oversold = IndicatorRow {
            williams_r: -85.0,
            ..neutral_row()
        };
        let findings = MomentumEvaluator.evaluate(&oversold);
        assert_eq!(findings.bullish[0].condition, "Oversold at -85.0");

        let edge = IndicatorRow {
            williams_r: -20.0,
            ..neutral_row()
        };
        assert!(MomentumEvaluator.evaluate(&edge).is_empty());
    }
}
