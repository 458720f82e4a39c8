//! Confluence Library
//!
//! Multi-indicator confluence engine for crypto pairs: fetches OHLCV history
//! (primary exchange with aggregator fallback), derives a technical indicator
//! table, evaluates momentum/trend/volatility/volume rules on the latest bar,
//! and aggregates the findings into a BULLISH/BEARISH/NEUTRAL call.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod features;
pub mod oracle;
pub mod strategy;
pub mod types;

pub use analyzer::{render_error, render_report, AnalysisResult, Analyzer};
pub use error::{AnalysisError, AnalysisOutcome, SourceError};
