//! Core types used throughout the confluence engine
//!
//! Candles, provenance tags, and the enums that classify findings and signals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream source produced a candle series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Exchange klines with real traded volume
    Primary,
    /// Aggregator OHLC with synthesized volume
    Fallback,
}

impl Provenance {
    /// Whether the volume column is a proxy rather than traded volume
    pub fn has_synthetic_volume(&self) -> bool {
        matches!(self, Provenance::Fallback)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Primary => write!(f, "primary"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// Candlestick data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since epoch
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume in base currency, or a proxy for fallback data
    pub volume: f64,
}

impl Candle {
    /// Check the OHLC envelope: positive finite prices, high/low bracket the body
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

/// Chronological candles for one symbol, tagged with where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    pub symbol: String,
    pub provenance: Provenance,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: impl Into<String>, provenance: Provenance, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            provenance,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Directional classification of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Bullish => write!(f, "bullish"),
            Disposition::Bearish => write!(f, "bearish"),
            Disposition::Neutral => write!(f, "neutral"),
        }
    }
}

/// Strength grade attached to a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strength {
    Low,
    Medium,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Low => write!(f, "Low"),
            Strength::Medium => write!(f, "Medium"),
            Strength::Strong => write!(f, "Strong"),
        }
    }
}

/// Horizon a finding is expected to matter over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "Short-term")]
    ShortTerm,
    #[serde(rename = "Short to Medium-term")]
    ShortToMediumTerm,
    #[serde(rename = "Medium-term")]
    MediumTerm,
    #[serde(rename = "Medium to Long-term")]
    MediumToLongTerm,
    #[serde(rename = "All timeframes")]
    AllTimeframes,
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::ShortTerm => write!(f, "Short-term"),
            Horizon::ShortToMediumTerm => write!(f, "Short to Medium-term"),
            Horizon::MediumTerm => write!(f, "Medium-term"),
            Horizon::MediumToLongTerm => write!(f, "Medium to Long-term"),
            Horizon::AllTimeframes => write!(f, "All timeframes"),
        }
    }
}

/// Overall call derived from the confluence counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for OverallSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallSignal::Bullish => write!(f, "BULLISH"),
            OverallSignal::Bearish => write!(f, "BEARISH"),
            OverallSignal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Grade of the overall call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Strong,
    Medium,
    Weak,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStrength::Strong => write!(f, "Strong"),
            SignalStrength::Medium => write!(f, "Medium"),
            SignalStrength::Weak => write!(f, "Weak"),
        }
    }
}
