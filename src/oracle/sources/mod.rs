//! Candle source implementations (Binance klines, CoinGecko OHLC)

mod binance;
mod coingecko;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::types::{Candle, Provenance};

/// How much history to ask a source for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWindow {
    /// Source-native interval token and bar count
    Klines { interval: String, limit: usize },
    /// Fixed calendar lookback; resolution is chosen by the source
    Days(u32),
}

/// Trait for historical candle sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Provenance stamped on every series this source returns
    fn provenance(&self) -> Provenance;

    /// Fetch chronological candles for `symbol`
    async fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Vec<Candle>, SourceError>;
}

/// Send a GET and decode the JSON body, mapping every failure to a `SourceError`
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    source_name: &'static str,
    timeout_secs: u64,
) -> Result<T, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::from_reqwest(source_name, timeout_secs, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SourceError::from_reqwest(source_name, timeout_secs, e))?;

    if !status.is_success() {
        return Err(SourceError::Status {
            source_name,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| SourceError::Decode {
        source_name,
        message: e.to_string(),
    })
}

/// Drop malformed rows, sort by open time and remove duplicate timestamps
pub(crate) fn normalize_candles(
    source_name: &'static str,
    symbol: &str,
    mut candles: Vec<Candle>,
) -> Result<Vec<Candle>, SourceError> {
    let raw = candles.len();
    candles.retain(Candle::is_well_formed);
    if candles.len() < raw {
        tracing::debug!(
            source = source_name,
            symbol = %symbol,
            dropped = raw - candles.len(),
            "Dropped malformed candles"
        );
    }

    candles.sort_by_key(|c| c.open_time);
    candles.dedup_by_key(|c| c.open_time);

    if candles.is_empty() {
        return Err(SourceError::NoData {
            source_name,
            symbol: symbol.to_string(),
        });
    }
    Ok(candles)
}
