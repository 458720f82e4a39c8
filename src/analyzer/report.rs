//! Text rendering of analysis outcomes
//!
//! Pure functions of their input: the same result always renders the same
//! report.

use crate::error::AnalysisError;
use crate::strategy::Finding;
use crate::types::{OverallSignal, Provenance};

use super::AnalysisResult;

/// Render the multi-section report for a completed analysis
pub fn render_report(analysis: &AnalysisResult) -> String {
    let mut output: Vec<String> = Vec::new();

    output.push(format!("📊 **Analysis for {}**", analysis.symbol));
    output.push(format!(
        "⏰ Generated: {}",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push(format!("💰 Current Price: ${:.6}", analysis.current_price));
    output.push(match analysis.provenance {
        Provenance::Primary => format!("📡 Data: primary source ({})", analysis.interval),
        Provenance::Fallback => {
            "📡 Data: fallback source (multi-day OHLC, synthetic volume)".to_string()
        }
    });
    output.push(String::new());

    // Overall signal
    let signal_emoji = match analysis.overall_signal {
        OverallSignal::Bullish => "🟢",
        OverallSignal::Bearish => "🔴",
        OverallSignal::Neutral => "🟡",
    };
    output.push(format!(
        "{} **Overall Signal: {} ({})**",
        signal_emoji, analysis.overall_signal, analysis.signal_strength
    ));
    output.push(String::new());

    // Confluence counts
    let counts = &analysis.confluence_counts;
    output.push(format!("📈 Bullish Confluences: {}", counts.bullish));
    output.push(format!("📉 Bearish Confluences: {}", counts.bearish));
    output.push(format!("⚪ Neutral Confluences: {}", counts.neutral));
    output.push(String::new());

    // Key levels
    let levels = &analysis.key_levels;
    output.push("🎯 **Key Levels:**".to_string());
    output.push(format!("   Resistance: ${:.6}", levels.resistance));
    output.push(format!("   Pivot: ${:.6}", levels.pivot));
    output.push(format!("   Support: ${:.6}", levels.support));
    output.push(String::new());

    // Technical snapshot
    let tech = &analysis.technical_snapshot;
    output.push("📋 **Technical Snapshot:**".to_string());
    output.push(format!("   RSI (14): {:.1}", tech.rsi));
    output.push(format!("   MACD: {:.6}", tech.macd));
    output.push(format!("   ADX: {:.1}", tech.adx));
    output.push(format!("   ATR%: {:.2}%", tech.atr_pct));
    output.push(format!("   BB Position: {:.3}", tech.bb_position));
    output.push(String::new());

    let confluences = &analysis.confluences;
    render_block(&mut output, "🟢 **Bullish Confluences:**", &confluences.bullish);
    render_block(&mut output, "🔴 **Bearish Confluences:**", &confluences.bearish);
    render_block(&mut output, "⚪ **Neutral Confluences:**", &confluences.neutral);

    output.join("\n")
}

fn render_block(output: &mut Vec<String>, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    output.push(title.to_string());
    for finding in findings {
        output.push(format!(
            "   • **{}** ({}, {})",
            finding.indicator, finding.strength, finding.timeframe
        ));
        output.push(format!("     {}", finding.condition));
        output.push(format!("     {}", finding.implication));
        output.push(String::new());
    }
}

/// Render a failed analysis
pub fn render_error(err: &AnalysisError) -> String {
    format!("❌ {err}")
}
