//! Analyzer - fetch -> enrich -> evaluate -> aggregate
//!
//! One call produces either a complete `AnalysisResult` or a typed
//! `AnalysisError`; no partial analyses are returned.

mod cache;
mod report;

pub use cache::ResultCache;
pub use report::{render_error, render_report};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::time::Duration;

use crate::config::{AnalysisConfig, AppConfig};
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::features::{IndicatorEngine, IndicatorRow};
use crate::oracle::CandleFeed;
use crate::strategy::{default_evaluators, ConfluenceEvaluator, Findings, IndicatorCluster};
use crate::types::{CandleSeries, OverallSignal, Provenance, SignalStrength};

/// Number of findings per disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfluenceCounts {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

/// Classic pivot levels of the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyLevels {
    pub resistance: f64,
    pub pivot: f64,
    pub support: f64,
}

/// Headline indicator values of the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub adx: f64,
    pub atr_pct: f64,
    pub bb_position: f64,
}

/// Complete, immutable outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub interval: String,
    pub provenance: Provenance,
    pub generated_at: DateTime<Utc>,
    pub current_price: f64,
    pub overall_signal: OverallSignal,
    pub signal_strength: SignalStrength,
    pub confluence_counts: ConfluenceCounts,
    pub confluences: Findings,
    pub key_levels: KeyLevels,
    pub technical_snapshot: TechnicalSnapshot,
}

/// Derive the overall call from the directional counts.
///
/// A side wins when it reaches `threshold` and strictly outnumbers the other;
/// it is graded Strong at `strong_count`. Anything else is a Weak NEUTRAL.
pub fn decide_signal(
    bullish: usize,
    bearish: usize,
    threshold: usize,
    strong_count: usize,
) -> (OverallSignal, SignalStrength) {
    let grade = |count: usize| {
        if count >= strong_count {
            SignalStrength::Strong
        } else {
            SignalStrength::Medium
        }
    };

    if bullish >= threshold && bullish > bearish {
        (OverallSignal::Bullish, grade(bullish))
    } else if bearish >= threshold && bearish > bullish {
        (OverallSignal::Bearish, grade(bearish))
    } else {
        (OverallSignal::Neutral, SignalStrength::Weak)
    }
}

/// Confluence engine over a candle feed
pub struct Analyzer {
    feed: CandleFeed,
    engine: IndicatorEngine,
    evaluators: Vec<Box<dyn ConfluenceEvaluator>>,
    config: AnalysisConfig,
    limit: usize,
    cache: Option<ResultCache>,
}

impl Analyzer {
    pub fn new(
        feed: CandleFeed,
        engine: IndicatorEngine,
        config: AnalysisConfig,
        limit: usize,
    ) -> Self {
        let cache = ResultCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            feed,
            engine,
            evaluators: default_evaluators(),
            config,
            limit,
            cache,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let feed = CandleFeed::from_config(config)?;
        let engine = IndicatorEngine::new(config.indicators.clone());
        Ok(Self::new(
            feed,
            engine,
            config.analysis.clone(),
            config.sources.limit,
        ))
    }

    /// Replace the evaluator set (order is preserved in the report)
    pub fn with_evaluators(mut self, evaluators: Vec<Box<dyn ConfluenceEvaluator>>) -> Self {
        self.evaluators = evaluators;
        self
    }

    pub fn default_interval(&self) -> &str {
        &self.config.default_interval
    }

    /// Run the full pipeline for one symbol
    pub async fn analyze(&self, symbol: &str, interval: &str) -> AnalysisOutcome<AnalysisResult> {
        let (symbol, interval) = validate_request(symbol, interval)?;

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&symbol, &interval).await {
                tracing::debug!(symbol = %symbol, interval = %interval, "Serving cached analysis");
                return Ok(hit);
            }
        }

        let series = self.feed.fetch(&symbol, &interval, self.limit).await?;
        let result = self.evaluate_series(&series, &interval)?;

        tracing::info!(
            symbol = %result.symbol,
            interval = %result.interval,
            provenance = %result.provenance,
            signal = %result.overall_signal,
            strength = %result.signal_strength,
            bullish = result.confluence_counts.bullish,
            bearish = result.confluence_counts.bearish,
            neutral = result.confluence_counts.neutral,
            "📊 Analysis complete"
        );

        if let Some(cache) = &self.cache {
            cache.insert(&symbol, &interval, result.clone()).await;
        }
        Ok(result)
    }

    /// Analyze several `(symbol, interval)` pairs concurrently.
    /// Results come back in request order.
    pub async fn analyze_many(
        &self,
        requests: &[(String, String)],
    ) -> Vec<AnalysisOutcome<AnalysisResult>> {
        join_all(
            requests
                .iter()
                .map(|(symbol, interval)| self.analyze(symbol, interval)),
        )
        .await
    }

    /// Everything after the fetch: enrich, evaluate the latest row, aggregate
    pub fn evaluate_series(
        &self,
        series: &CandleSeries,
        interval: &str,
    ) -> AnalysisOutcome<AnalysisResult> {
        let rows = self.engine.enrich(&series.candles);
        let Some(latest) = rows.last() else {
            tracing::warn!(
                symbol = %series.symbol,
                candles = series.len(),
                required = self.engine.min_candles(),
                "No fully-computed indicator rows"
            );
            return Err(AnalysisError::EmptyDataset {
                candles: series.len(),
                required: self.engine.min_candles(),
            });
        };

        let findings = self.collect_findings(latest, series.provenance);
        Ok(self.build_result(series, interval, latest, findings, Utc::now()))
    }

    fn collect_findings(&self, row: &IndicatorRow, provenance: Provenance) -> Findings {
        let skip_volume =
            self.config.discount_synthetic_volume && provenance.has_synthetic_volume();

        let mut findings = Findings::default();
        for evaluator in &self.evaluators {
            if skip_volume && evaluator.cluster() == IndicatorCluster::Volume {
                tracing::debug!(provenance = %provenance, "Skipping volume rules on synthetic volume");
                continue;
            }
            findings.merge(evaluator.evaluate(row));
        }
        findings
    }

    fn build_result(
        &self,
        series: &CandleSeries,
        interval: &str,
        latest: &IndicatorRow,
        findings: Findings,
        generated_at: DateTime<Utc>,
    ) -> AnalysisResult {
        let counts = ConfluenceCounts {
            bullish: findings.bullish.len(),
            bearish: findings.bearish.len(),
            neutral: findings.neutral.len(),
        };
        let (overall_signal, signal_strength) = decide_signal(
            counts.bullish,
            counts.bearish,
            self.config.confluence_threshold,
            self.config.strong_signal_count,
        );

        AnalysisResult {
            symbol: series.symbol.clone(),
            interval: interval.to_string(),
            provenance: series.provenance,
            generated_at,
            current_price: latest.close(),
            overall_signal,
            signal_strength,
            confluence_counts: counts,
            confluences: findings,
            key_levels: KeyLevels {
                resistance: latest.r1,
                pivot: latest.pivot,
                support: latest.s1,
            },
            technical_snapshot: TechnicalSnapshot {
                rsi: latest.rsi_fast,
                macd: latest.macd,
                adx: latest.adx,
                atr_pct: latest.atr_pct,
                bb_position: latest.bb_position,
            },
        }
    }
}

/// Separators accepted in pair notation (`BTC-USDT`, `btc/usdt`, `BTC_USDT`)
const PAIR_SEPARATORS: [char; 3] = ['-', '/', '_'];

/// Normalize a request: symbols are case-insensitive and stored uppercase
/// without separators; intervals are exchange tokens such as `15m` or `1d`
fn validate_request(symbol: &str, interval: &str) -> AnalysisOutcome<(String, String)> {
    let symbol: String = symbol
        .trim()
        .chars()
        .filter(|c| !PAIR_SEPARATORS.contains(c))
        .collect::<String>()
        .to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AnalysisError::InvalidRequest(format!(
            "symbol must be a non-empty alphanumeric pair, got {symbol:?}"
        )));
    }

    let interval = interval.trim().to_string();
    if interval.is_empty() || !interval.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AnalysisError::InvalidRequest(format!(
            "interval must be an alphanumeric token such as 15m, got {interval:?}"
        )));
    }
    Ok((symbol, interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::oracle::sources::{FetchWindow, MockCandleSource};
    use crate::strategy::test_support::neutral_row;
    use crate::types::Candle;
    use std::sync::Arc;

    #[test]
    fn test_decide_signal_grades() {
        assert_eq!(
            decide_signal(4, 1, 3, 5),
            (OverallSignal::Bullish, SignalStrength::Medium)
        );
        assert_eq!(
            decide_signal(5, 1, 3, 5),
            (OverallSignal::Bullish, SignalStrength::Strong)
        );
        assert_eq!(
            decide_signal(0, 3, 3, 5),
            (OverallSignal::Bearish, SignalStrength::Medium)
        );
    }

    #[test]
    fn test_decide_signal_requires_threshold_and_majority() {
        assert_eq!(
            decide_signal(2, 0, 3, 5),
            (OverallSignal::Neutral, SignalStrength::Weak)
        );
        assert_eq!(
            decide_signal(4, 4, 3, 5),
            (OverallSignal::Neutral, SignalStrength::Weak)
        );
    }

    #[test]
    fn test_validate_request() {
        assert_eq!(
            validate_request(" btcusdt ", "15m").unwrap(),
            ("BTCUSDT".to_string(), "15m".to_string())
        );
        assert!(matches!(
            validate_request("", "15m"),
            Err(AnalysisError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request("BTC$USDT", "15m"),
            Err(AnalysisError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request("--", "15m"),
            Err(AnalysisError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request("BTCUSDT", " "),
            Err(AnalysisError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_pair_separators_are_stripped() {
        for raw in ["BTC-USDT", "btc/usdt", "BTC_USDT", " btc-usdt "] {
            assert_eq!(validate_request(raw, "1h").unwrap().0, "BTCUSDT");
        }
    }

    #[test]
    fn test_interval_must_be_a_plain_token() {
        assert_eq!(validate_request("BTCUSDT", " 1d ").unwrap().1, "1d");
        for interval in ["15m&limit=5&symbol=ETHUSDT", "1h#", "15 m", "1d?x=1"] {
            assert!(matches!(
                validate_request("BTCUSDT", interval),
                Err(AnalysisError::InvalidRequest(_))
            ));
        }
    }

    fn uptrend(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 1000.0 + i as f64;
                Candle {
                    open_time: i as i64 * 900_000,
                    open: close - 0.5,
                    high: close + 20.0,
                    low: close - 20.0,
                    close,
                    volume: 500.0,
                }
            })
            .collect()
    }

    fn analyzer_with(source: MockCandleSource, config: AnalysisConfig) -> Analyzer {
        let feed = CandleFeed::new(Arc::new(source), None, 30);
        Analyzer::new(feed, IndicatorEngine::default(), config, 1000)
    }

    fn mock_source(candles: Vec<Candle>, provenance: Provenance, calls: usize) -> MockCandleSource {
        let mut source = MockCandleSource::new();
        source.expect_name().return_const("Binance");
        source.expect_provenance().return_const(provenance);
        source
            .expect_fetch()
            .times(calls)
            .returning(move |_, _| Ok(candles.clone()));
        source
    }

    #[tokio::test]
    async fn test_uptrend_is_bullish() {
        let analyzer = analyzer_with(
            mock_source(uptrend(60), Provenance::Primary, 1),
            AnalysisConfig::default(),
        );
        let result = analyzer.analyze("btcusdt", "15m").await.unwrap();

        assert_eq!(result.symbol, "BTCUSDT");
        assert_eq!(result.interval, "15m");
        assert_eq!(result.overall_signal, OverallSignal::Bullish);
        assert_eq!(result.current_price, 1059.0);
        assert_eq!(
            result.confluence_counts.bullish,
            result.confluences.bullish.len()
        );
    }

    #[tokio::test]
    async fn test_short_history_is_empty_dataset() {
        let analyzer = analyzer_with(
            mock_source(uptrend(30), Provenance::Primary, 1),
            AnalysisConfig::default(),
        );
        let err = analyzer.analyze("BTCUSDT", "15m").await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::EmptyDataset {
                candles: 30,
                required: 50
            }
        );
    }

    #[tokio::test]
    async fn test_source_failure_is_returned_not_raised() {
        let mut source = MockCandleSource::new();
        source.expect_name().return_const("Binance");
        source.expect_provenance().return_const(Provenance::Primary);
        source
            .expect_fetch()
            .withf(|_, window| matches!(window, FetchWindow::Klines { limit: 1000, .. }))
            .returning(|_, _| {
                Err(SourceError::Transport {
                    source_name: "Binance",
                    message: "connection refused".to_string(),
                })
            });

        let analyzer = analyzer_with(source, AnalysisConfig::default());
        let err = analyzer.analyze("BTCUSDT", "15m").await.unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_requests() {
        let config = AnalysisConfig {
            cache_ttl_secs: 60,
            ..AnalysisConfig::default()
        };
        let analyzer = analyzer_with(mock_source(uptrend(60), Provenance::Primary, 1), config);

        let first = analyzer.analyze("BTCUSDT", "15m").await.unwrap();
        let second = analyzer.analyze("btcusdt", "15m").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_analyze_many_keeps_request_order() {
        let analyzer = analyzer_with(
            mock_source(uptrend(60), Provenance::Primary, 2),
            AnalysisConfig::default(),
        );
        let requests = vec![
            ("BTCUSDT".to_string(), "15m".to_string()),
            ("".to_string(), "15m".to_string()),
            ("ETHUSDT".to_string(), "1h".to_string()),
        ];

        let results = analyzer.analyze_many(&requests).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().symbol, "BTCUSDT");
        assert!(matches!(results[1], Err(AnalysisError::InvalidRequest(_))));
        assert_eq!(results[2].as_ref().unwrap().interval, "1h");
    }

    #[test]
    fn test_synthetic_volume_discount() {
        let source = MockCandleSource::new();
        let config = AnalysisConfig {
            discount_synthetic_volume: true,
            ..AnalysisConfig::default()
        };
        let analyzer = analyzer_with(source, config);

        let row = IndicatorRow {
            volume_ratio: 3.0,
            cmf: 0.5,
            ..neutral_row()
        };
        let fallback = analyzer.collect_findings(&row, Provenance::Fallback);
        assert!(fallback.iter().all(|f| f.cluster != IndicatorCluster::Volume));

        let primary = analyzer.collect_findings(&row, Provenance::Primary);
        assert_eq!(
            primary
                .iter()
                .filter(|f| f.cluster == IndicatorCluster::Volume)
                .count(),
            2
        );
    }
}
