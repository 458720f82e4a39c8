//! Binance REST client for historical klines
//!
//! Primary source: real OHLCV at the caller's interval.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::SourceError;
use crate::oracle::sources::{get_json, normalize_candles, CandleSource, FetchWindow};
use crate::types::{Candle, Provenance};

const SOURCE_NAME: &str = "Binance";
const KLINES_PATH: &str = "/api/v3/klines";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";
/// Binance rejects larger `limit` values
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout_secs: u64, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
        })
    }

    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        Self::new(
            &config.primary_base_url,
            config.timeout_secs,
            config.primary_api_key.clone(),
        )
    }

    /// Klines request with every parameter passed through the query encoder
    fn klines_request(&self, symbol: &str, interval: &str, limit: usize) -> reqwest::RequestBuilder {
        let limit = limit.clamp(1, MAX_LIMIT).to_string();
        let request = self
            .client
            .get(format!("{}{}", self.base_url, KLINES_PATH))
            .query(&[
                ("symbol", symbol.to_uppercase().as_str()),
                ("interval", interval),
                ("limit", limit.as_str()),
            ]);

        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Parse kline rows:
    /// [[open_time, "open", "high", "low", "close", "volume", close_time, ...], ...]
    pub fn parse_klines(klines: Vec<Vec<serde_json::Value>>) -> Vec<Candle> {
        klines
            .into_iter()
            .filter_map(|kline| {
                if kline.len() < 6 {
                    return None;
                }

                Some(Candle {
                    open_time: kline[0].as_i64()?,
                    open: kline[1].as_str()?.parse().ok()?,
                    high: kline[2].as_str()?.parse().ok()?,
                    low: kline[3].as_str()?.parse().ok()?,
                    close: kline[4].as_str()?.parse().ok()?,
                    volume: kline[5].as_str()?.parse().ok()?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn provenance(&self) -> Provenance {
        Provenance::Primary
    }

    async fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Vec<Candle>, SourceError> {
        let request = match window {
            FetchWindow::Klines { interval, limit } => {
                self.klines_request(symbol, interval, *limit)
            }
            FetchWindow::Days(days) => self.klines_request(symbol, "1d", *days as usize),
        };

        tracing::info!(
            source = SOURCE_NAME,
            symbol = %symbol,
            path = KLINES_PATH,
            "📥 Fetching historical candles..."
        );

        let klines: Vec<Vec<serde_json::Value>> =
            get_json(request, SOURCE_NAME, self.timeout_secs).await?;
        let candles = normalize_candles(SOURCE_NAME, symbol, Self::parse_klines(klines))?;

        tracing::info!(
            source = SOURCE_NAME,
            symbol = %symbol,
            count = candles.len(),
            "✅ Historical candles fetched"
        );

        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_klines() {
        let raw = vec![
            vec![
                json!(1700000000000i64),
                json!("37000.10"),
                json!("37100.00"),
                json!("36950.50"),
                json!("37050.25"),
                json!("12.5"),
                json!(1700000899999i64),
                json!("463000.0"),
                json!(1200),
                json!("6.0"),
                json!("222000.0"),
                json!("0"),
            ],
            // truncated row is skipped
            vec![json!(1700000900000i64), json!("37050.25")],
        ];

        let candles = BinanceClient::parse_klines(raw);
        assert_eq!(candles.len(), 1);
        let c = candles[0];
        assert_eq!(c.open_time, 1700000000000);
        assert_eq!(c.open, 37000.10);
        assert_eq!(c.high, 37100.00);
        assert_eq!(c.low, 36950.50);
        assert_eq!(c.close, 37050.25);
        assert_eq!(c.volume, 12.5);
    }

    fn query_of(client: &BinanceClient, symbol: &str, interval: &str, limit: usize) -> Vec<(String, String)> {
        let request = client.klines_request(symbol, interval, limit).build().unwrap();
        assert_eq!(request.url().path(), "/api/v3/klines");
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_klines_request_uppercases_symbol() {
        let client = BinanceClient::new("https://api.binance.com/", 10, None).unwrap();
        let request = client.klines_request("btcusdt", "15m", 1000).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=15m&limit=1000"
        );

        let query = query_of(&client, "ETHUSDT", "1h", 5000);
        assert_eq!(query[2], ("limit".to_string(), "1000".to_string()));
    }

    #[test]
    fn test_interval_cannot_add_query_parameters() {
        let client = BinanceClient::new("https://api.binance.com", 10, None).unwrap();
        let query = query_of(&client, "BTCUSDT", "15m&limit=5&symbol=ETHUSDT", 1000);

        assert_eq!(query.len(), 3);
        assert_eq!(query[0], ("symbol".to_string(), "BTCUSDT".to_string()));
        assert_eq!(
            query[1],
            ("interval".to_string(), "15m&limit=5&symbol=ETHUSDT".to_string())
        );
        assert_eq!(query[2], ("limit".to_string(), "1000".to_string()));
    }

    #[test]
    fn test_api_key_header() {
        let client =
            BinanceClient::new("https://api.binance.com", 10, Some("secret".to_string())).unwrap();
        let request = client.klines_request("BTCUSDT", "1d", 30).build().unwrap();
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
    }
}
