//! Error taxonomy for fetching and analysis
//!
//! Every failure path inside the engine resolves to one of these values;
//! nothing crosses the `analyze` boundary as a panic.

use thiserror::Error;

/// Failure of a single upstream source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("{source_name} API error {status}: {body}")]
    Status {
        source_name: &'static str,
        status: u16,
        body: String,
    },

    #[error("{source_name} request timed out after {timeout_secs}s")]
    Timeout {
        source_name: &'static str,
        timeout_secs: u64,
    },

    #[error("{source_name} transport error: {message}")]
    Transport {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} returned an undecodable body: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} returned no usable candles for {symbol}")]
    NoData {
        source_name: &'static str,
        symbol: String,
    },
}

impl SourceError {
    /// HTTP 451: the primary exchange refuses service in this location
    pub const RESTRICTED_STATUS: u16 = 451;

    pub fn source_name(&self) -> &'static str {
        match self {
            SourceError::Status { source_name, .. }
            | SourceError::Timeout { source_name, .. }
            | SourceError::Transport { source_name, .. }
            | SourceError::Decode { source_name, .. }
            | SourceError::NoData { source_name, .. } => source_name,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.status() == Some(Self::RESTRICTED_STATUS)
    }

    /// Map a reqwest failure, keeping timeouts distinguishable
    pub(crate) fn from_reqwest(
        source_name: &'static str,
        timeout_secs: u64,
        err: reqwest::Error,
    ) -> Self {
        if err.is_timeout() {
            SourceError::Timeout {
                source_name,
                timeout_secs,
            }
        } else if err.is_decode() {
            SourceError::Decode {
                source_name,
                message: err.to_string(),
            }
        } else {
            SourceError::Transport {
                source_name,
                message: err.to_string(),
            }
        }
    }
}

/// Terminal outcome of an analysis request that did not produce a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to fetch data: {0}")]
    SourceUnavailable(SourceError),

    #[error("Failed to fetch data from both sources: {primary}; fallback: {fallback}")]
    AllSourcesFailed {
        primary: SourceError,
        fallback: SourceError,
    },

    #[error("No data available: {candles} candles yield no fully-computed rows (need at least {required})")]
    EmptyDataset { candles: usize, required: usize },
}

pub type AnalysisOutcome<T> = std::result::Result<T, AnalysisError>;
