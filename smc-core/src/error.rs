//! Typed errors for structurally invalid input and configuration.
//!
//! Detector "insufficient data" is never an error: detectors degrade to an
//! empty result. Rejections are normal outcomes, see
//! [`RejectionReason`](crate::domain::RejectionReason).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmcError {
    #[error("candle window is empty")]
    EmptyWindow,

    #[error("timestamps must be strictly increasing (violation at index {index})")]
    NonMonotonicTimestamp { index: usize },

    #[error("malformed candle at index {index}: {reason}")]
    MalformedCandle { index: usize, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
