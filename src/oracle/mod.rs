//! Oracle module - Historical candle feed with source fallback
//!
//! Pulls OHLCV history from the primary exchange and, when that fails for any
//! reason, takes a single hop to the fallback aggregator. Every series carries
//! the provenance of the source that produced it.

mod symbols;
pub mod sources;

pub use symbols::SymbolMap;

use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::types::CandleSeries;
use sources::{BinanceClient, CandleSource, CoinGeckoClient, FetchWindow};

/// Primary -> fallback candle adapter
#[derive(Clone)]
pub struct CandleFeed {
    primary: Arc<dyn CandleSource>,
    fallback: Option<Arc<dyn CandleSource>>,
    fallback_days: u32,
}

impl CandleFeed {
    pub fn new(
        primary: Arc<dyn CandleSource>,
        fallback: Option<Arc<dyn CandleSource>>,
        fallback_days: u32,
    ) -> Self {
        Self {
            primary,
            fallback,
            fallback_days,
        }
    }

    /// Build the Binance -> CoinGecko feed from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let primary: Arc<dyn CandleSource> =
            Arc::new(BinanceClient::from_config(&config.sources)?);

        let fallback: Option<Arc<dyn CandleSource>> = if config.sources.fallback_enabled {
            let symbols = SymbolMap::with_overrides(&config.symbols.overrides);
            Some(Arc::new(CoinGeckoClient::from_config(
                &config.sources,
                symbols,
            )?))
        } else {
            None
        };

        Ok(Self::new(primary, fallback, config.sources.fallback_days))
    }

    /// Fetch candles for `symbol`.
    ///
    /// The primary is queried with the caller's interval and limit. On any
    /// failure the fallback is queried once with a fixed day window that
    /// ignores the interval. There is no further retry.
    pub async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> AnalysisOutcome<CandleSeries> {
        let window = FetchWindow::Klines {
            interval: interval.to_string(),
            limit,
        };

        let primary_err = match self.primary.fetch(symbol, &window).await {
            Ok(candles) => {
                return Ok(CandleSeries::new(
                    symbol,
                    self.primary.provenance(),
                    candles,
                ))
            }
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            tracing::warn!(
                source = primary_err.source_name(),
                symbol = %symbol,
                error = %primary_err,
                "Primary source failed and no fallback is configured"
            );
            return Err(AnalysisError::SourceUnavailable(primary_err));
        };

        if primary_err.is_restricted() {
            tracing::warn!(
                source = primary_err.source_name(),
                symbol = %symbol,
                status = 451,
                fallback = fallback.name(),
                "⚠️ Primary source geo-restricted, switching to fallback"
            );
        } else {
            tracing::warn!(
                source = primary_err.source_name(),
                symbol = %symbol,
                status = ?primary_err.status(),
                error = %primary_err,
                fallback = fallback.name(),
                "⚠️ Primary source failed, switching to fallback"
            );
        }

        let fallback_window = FetchWindow::Days(self.fallback_days);
        match fallback.fetch(symbol, &fallback_window).await {
            Ok(candles) => Ok(CandleSeries::new(symbol, fallback.provenance(), candles)),
            Err(fallback_err) => {
                tracing::error!(
                    symbol = %symbol,
                    primary = %primary_err,
                    fallback = %fallback_err,
                    "❌ All candle sources failed"
                );
                Err(AnalysisError::AllSourcesFailed {
                    primary: primary_err,
                    fallback: fallback_err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::types::{Candle, Provenance};
    use sources::MockCandleSource;

    fn make_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                open_time: i as i64 * 60_000,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 10.0,
            })
            .collect()
    }

    fn restricted() -> SourceError {
        SourceError::Status {
            source_name: "Binance",
            status: 451,
            body: "Service unavailable from a restricted location".to_string(),
        }
    }

    fn mock_primary() -> MockCandleSource {
        let mut primary = MockCandleSource::new();
        primary.expect_name().return_const("Binance");
        primary
            .expect_provenance()
            .return_const(Provenance::Primary);
        primary
    }

    fn mock_fallback() -> MockCandleSource {
        let mut fallback = MockCandleSource::new();
        fallback.expect_name().return_const("CoinGecko");
        fallback
            .expect_provenance()
            .return_const(Provenance::Fallback);
        fallback
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mut primary = mock_primary();
        primary
            .expect_fetch()
            .withf(|symbol, window| {
                symbol == "BTCUSDT"
                    && *window
                        == FetchWindow::Klines {
                            interval: "15m".to_string(),
                            limit: 1000,
                        }
            })
            .times(1)
            .returning(|_, _| Ok(make_candles(5)));

        let mut fallback = mock_fallback();
        fallback.expect_fetch().never();

        let feed = CandleFeed::new(Arc::new(primary), Some(Arc::new(fallback)), 30);
        let series = feed.fetch("BTCUSDT", "15m", 1000).await.unwrap();

        assert_eq!(series.provenance, Provenance::Primary);
        assert_eq!(series.len(), 5);
        assert_eq!(series.symbol, "BTCUSDT");
    }

    #[tokio::test]
    async fn test_restricted_primary_uses_thirty_day_fallback() {
        let mut primary = mock_primary();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(restricted()));

        let mut fallback = mock_fallback();
        fallback
            .expect_fetch()
            .withf(|symbol, window| symbol == "BTCUSDT" && *window == FetchWindow::Days(30))
            .times(1)
            .returning(|_, _| Ok(make_candles(3)));

        let feed = CandleFeed::new(Arc::new(primary), Some(Arc::new(fallback)), 30);
        let series = feed.fetch("BTCUSDT", "1h", 500).await.unwrap();

        assert_eq!(series.provenance, Provenance::Fallback);
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn test_timeout_also_falls_back() {
        let mut primary = mock_primary();
        primary.expect_fetch().times(1).returning(|_, _| {
            Err(SourceError::Timeout {
                source_name: "Binance",
                timeout_secs: 10,
            })
        });

        let mut fallback = mock_fallback();
        fallback
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(make_candles(2)));

        let feed = CandleFeed::new(Arc::new(primary), Some(Arc::new(fallback)), 30);
        let series = feed.fetch("ETHUSDT", "15m", 1000).await.unwrap();
        assert_eq!(series.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_both_sources_failing_reports_both_causes() {
        let mut primary = mock_primary();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(restricted()));

        let mut fallback = mock_fallback();
        fallback.expect_fetch().times(1).returning(|_, _| {
            Err(SourceError::Status {
                source_name: "CoinGecko",
                status: 429,
                body: "rate limited".to_string(),
            })
        });

        let feed = CandleFeed::new(Arc::new(primary), Some(Arc::new(fallback)), 30);
        let err = feed.fetch("BTCUSDT", "15m", 1000).await.unwrap_err();

        match err {
            AnalysisError::AllSourcesFailed { primary, fallback } => {
                assert_eq!(primary.status(), Some(451));
                assert_eq!(fallback.status(), Some(429));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_fallback_surfaces_primary_error() {
        let mut primary = mock_primary();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(restricted()));

        let feed = CandleFeed::new(Arc::new(primary), None, 30);
        let err = feed.fetch("BTCUSDT", "15m", 1000).await.unwrap_err();

        assert_eq!(err, AnalysisError::SourceUnavailable(restricted()));
    }
}
