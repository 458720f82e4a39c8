//! CoinGecko REST client for OHLC history
//!
//! Fallback source. The OHLC endpoint has no volume column, so a proxy
//! `(high - low) * close * volume_factor` is synthesized per candle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::SourceError;
use crate::oracle::sources::{get_json, normalize_candles, CandleSource, FetchWindow};
use crate::oracle::SymbolMap;
use crate::types::{Candle, Provenance};

const SOURCE_NAME: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    symbols: SymbolMap,
    default_days: u32,
    volume_factor: f64,
}

impl CoinGeckoClient {
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        api_key: Option<String>,
        symbols: SymbolMap,
        default_days: u32,
        volume_factor: f64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
            symbols,
            default_days,
            volume_factor,
        })
    }

    pub fn from_config(config: &SourcesConfig, symbols: SymbolMap) -> Result<Self> {
        Self::new(
            &config.fallback_base_url,
            config.timeout_secs,
            config.fallback_api_key.clone(),
            symbols,
            config.fallback_days,
            config.fallback_volume_factor,
        )
    }

    fn ohlc_request(&self, coin_id: &str, days: u32) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}/api/v3/coins/{}/ohlc", self.base_url, coin_id))
            .query(&[("vs_currency", "usd".to_string()), ("days", days.to_string())]);

        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Parse OHLC rows `[[timestamp, open, high, low, close], ...]` and attach the volume proxy
    pub fn parse_ohlc(rows: Vec<Vec<serde_json::Value>>, volume_factor: f64) -> Vec<Candle> {
        rows.into_iter()
            .filter_map(|row| {
                if row.len() < 5 {
                    return None;
                }

                let high = row[2].as_f64()?;
                let low = row[3].as_f64()?;
                let close = row[4].as_f64()?;

                Some(Candle {
                    open_time: row[0].as_i64().or_else(|| row[0].as_f64().map(|t| t as i64))?,
                    open: row[1].as_f64()?,
                    high,
                    low,
                    close,
                    volume: (high - low) * close * volume_factor,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    async fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Vec<Candle>, SourceError> {
        // The OHLC endpoint picks its own granularity from the day count
        let days = match window {
            FetchWindow::Days(days) => *days,
            FetchWindow::Klines { .. } => self.default_days,
        };
        let coin_id = self.symbols.coin_id(symbol);
        let request = self.ohlc_request(&coin_id, days);

        tracing::info!(
            source = SOURCE_NAME,
            symbol = %symbol,
            coin_id = %coin_id,
            days,
            "📥 Fetching OHLC history..."
        );

        let rows: Vec<Vec<serde_json::Value>> =
            get_json(request, SOURCE_NAME, self.timeout_secs).await?;
        let candles =
            normalize_candles(SOURCE_NAME, symbol, Self::parse_ohlc(rows, self.volume_factor))?;

        tracing::info!(
            source = SOURCE_NAME,
            symbol = %symbol,
            count = candles.len(),
            "✅ OHLC history fetched (synthetic volume)"
        );

        Ok(candles)
    }
}
