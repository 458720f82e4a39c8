//! Configuration management for the confluence engine
//!
//! Loads from optional config files + environment variables via .env

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    pub indicators: IndicatorConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Primary exchange REST base (klines endpoint is appended)
    pub primary_base_url: String,
    /// Fallback aggregator REST base (OHLC endpoint is appended)
    pub fallback_base_url: String,
    /// Take the fallback hop when the primary fails
    pub fallback_enabled: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Number of klines requested from the primary
    pub limit: usize,
    /// Fixed lookback used by the fallback, independent of the interval
    pub fallback_days: u32,
    /// Multiplier for the fallback volume proxy
    pub fallback_volume_factor: f64,
    /// Opaque credential for the primary, sent as a header when set
    #[serde(default)]
    pub primary_api_key: Option<String>,
    /// Opaque credential for the fallback, sent as a header when set
    #[serde(default)]
    pub fallback_api_key: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary_base_url: "https://api.binance.com".to_string(),
            fallback_base_url: "https://api.coingecko.com".to_string(),
            fallback_enabled: true,
            timeout_secs: 10,
            limit: 1000,
            fallback_days: 30,
            fallback_volume_factor: 1000.0,
            primary_api_key: None,
            fallback_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolsConfig {
    /// Trading pair -> fallback asset id, layered over the built-in table
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

/// Indicator periods
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_fast: usize,
    pub rsi_slow: usize,
    pub stoch_window: usize,
    pub stoch_smooth: usize,
    pub williams_window: usize,
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub keltner_period: usize,
    pub atr_period: usize,
    pub volume_sma_period: usize,
    pub cmf_period: usize,
    pub roc_fast: usize,
    pub roc_slow: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_fast: 14,
            rsi_slow: 21,
            stoch_window: 14,
            stoch_smooth: 3,
            williams_window: 14,
            ema_fast: 9,
            ema_mid: 21,
            ema_slow: 50,
            sma_fast: 20,
            sma_slow: 50,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
            keltner_period: 20,
            atr_period: 14,
            volume_sma_period: 20,
            cmf_period: 20,
            roc_fast: 5,
            roc_slow: 14,
        }
    }
}

impl IndicatorConfig {
    /// Longest window any indicator needs; rows before it are discarded
    pub fn max_lookback(&self) -> usize {
        [
            self.rsi_fast + 1,
            self.rsi_slow + 1,
            self.stoch_window + self.stoch_smooth - 1,
            self.williams_window,
            self.ema_fast,
            self.ema_mid,
            self.ema_slow,
            self.sma_fast,
            self.sma_slow,
            self.macd_slow + self.macd_signal - 1,
            self.adx_period * 2,
            self.bb_period,
            self.keltner_period,
            self.atr_period,
            self.volume_sma_period,
            self.cmf_period,
            self.roc_fast + 1,
            self.roc_slow + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum directional confluences for a non-neutral call
    pub confluence_threshold: usize,
    /// Winning count at which the call is graded Strong
    pub strong_signal_count: usize,
    /// Interval used when the caller does not pass one
    pub default_interval: String,
    /// Result cache lifetime; 0 disables caching
    pub cache_ttl_secs: u64,
    /// Skip volume findings when volume is a fallback proxy
    pub discount_synthetic_volume: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confluence_threshold: 3,
            strong_signal_count: 5,
            default_interval: "15m".to_string(),
            cache_ttl_secs: 0,
            discount_synthetic_volume: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (CONFLUENCE__*)
            .add_source(Environment::with_prefix("CONFLUENCE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Builder pre-populated with every default, ready for extra sources
    pub fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            // Source defaults
            .set_default("sources.primary_base_url", "https://api.binance.com")?
            .set_default("sources.fallback_base_url", "https://api.coingecko.com")?
            .set_default("sources.fallback_enabled", true)?
            .set_default("sources.timeout_secs", 10)?
            .set_default("sources.limit", 1000)?
            .set_default("sources.fallback_days", 30)?
            .set_default("sources.fallback_volume_factor", 1000.0)?
            // Indicator defaults
            .set_default("indicators.rsi_fast", 14)?
            .set_default("indicators.rsi_slow", 21)?
            .set_default("indicators.stoch_window", 14)?
            .set_default("indicators.stoch_smooth", 3)?
            .set_default("indicators.williams_window", 14)?
            .set_default("indicators.ema_fast", 9)?
            .set_default("indicators.ema_mid", 21)?
            .set_default("indicators.ema_slow", 50)?
            .set_default("indicators.sma_fast", 20)?
            .set_default("indicators.sma_slow", 50)?
            .set_default("indicators.macd_fast", 12)?
            .set_default("indicators.macd_slow", 26)?
            .set_default("indicators.macd_signal", 9)?
            .set_default("indicators.adx_period", 14)?
            .set_default("indicators.bb_period", 20)?
            .set_default("indicators.bb_std_dev", 2.0)?
            .set_default("indicators.keltner_period", 20)?
            .set_default("indicators.atr_period", 14)?
            .set_default("indicators.volume_sma_period", 20)?
            .set_default("indicators.cmf_period", 20)?
            .set_default("indicators.roc_fast", 5)?
            .set_default("indicators.roc_slow", 14)?
            // Analysis defaults
            .set_default("analysis.confluence_threshold", 3)?
            .set_default("analysis.strong_signal_count", 5)?
            .set_default("analysis.default_interval", "15m")?
            .set_default("analysis.cache_ttl_secs", 0)?
            .set_default("analysis.discount_synthetic_volume", false)?;

        Ok(builder)
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "primary={} fallback={} fallback_enabled={} timeout={}s limit={} fallback_days={} threshold={} cache_ttl={}s overrides={}",
            self.sources.primary_base_url,
            self.sources.fallback_base_url,
            self.sources.fallback_enabled,
            self.sources.timeout_secs,
            self.sources.limit,
            self.sources.fallback_days,
            self.analysis.confluence_threshold,
            self.analysis.cache_ttl_secs,
            self.symbols.overrides.len(),
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
