//! Volume rules: volume ratio, Chaikin Money Flow

use super::{ConfluenceEvaluator, Finding, Findings, IndicatorCluster};
use crate::features::IndicatorRow;
use crate::types::{Disposition, Horizon, Strength};

const VOLUME_SPIKE: f64 = 2.0;
const VOLUME_DRY: f64 = 0.5;
const CMF_BUYING: f64 = 0.2;
const CMF_SELLING: f64 = -0.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeEvaluator;

impl ConfluenceEvaluator for VolumeEvaluator {
    fn cluster(&self) -> IndicatorCluster {
        IndicatorCluster::Volume
    }

    fn evaluate(&self, row: &IndicatorRow) -> Findings {
        let mut findings = Findings::default();

        let ratio = row.volume_ratio;
        if ratio > VOLUME_SPIKE {
            findings.push(Finding::new(
                "Volume",
                IndicatorCluster::Volume,
                Disposition::Neutral,
                Strength::Strong,
                Horizon::AllTimeframes,
                format!("High volume ({ratio:.1}x average)"),
                "Strong institutional interest. Confirms price moves.",
            ));
        } else if ratio < VOLUME_DRY {
            findings.push(Finding::new(
                "Volume",
                IndicatorCluster::Volume,
                Disposition::Neutral,
                Strength::Medium,
                Horizon::AllTimeframes,
                format!("Low volume ({ratio:.1}x average)"),
                "Weak participation. Price moves may lack conviction.",
            ));
        }

        let cmf = row.cmf;
        if cmf > CMF_BUYING {
            findings.push(Finding::new(
                "Chaikin Money Flow",
                IndicatorCluster::Volume,
                Disposition::Bullish,
                Strength::Medium,
                Horizon::MediumTerm,
                format!("Strong buying pressure (CMF: {cmf:.3})"),
                "Money flowing into the asset. Supports bullish bias.",
            ));
        } else if cmf < CMF_SELLING {
            findings.push(Finding::new(
                "Chaikin Money Flow",
                IndicatorCluster::Volume,
                Disposition::Bearish,
                Strength::Medium,
                Horizon::MediumTerm,
                format!("Strong selling pressure (CMF: {cmf:.3})"),
                "Money flowing out of the asset. Supports bearish bias.",
            ));
        }

        findings
    }
}
