//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SmcError;

/// OHLCV candle for a single symbol on a single timeframe.
///
/// Candles are immutable once ingested. A window is an ordered slice with
/// strictly increasing timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Returns true if every OHLCV field is finite.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Basic OHLCV sanity check: finite fields, high >= low, high >= open, etc.
    pub fn is_sane(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Validate a candle window before it enters the pipeline.
///
/// Structural violations (empty window, malformed candle, non-increasing
/// timestamps) are surfaced as typed errors, never repaired.
pub fn validate_window(candles: &[Candle]) -> Result<(), SmcError> {
    if candles.is_empty() {
        return Err(SmcError::EmptyWindow);
    }

    for (index, candle) in candles.iter().enumerate() {
        if !candle.is_sane() {
            let reason = if candle.is_void() {
                "NaN field".to_string()
            } else if !candle.is_finite() {
                "infinite field".to_string()
            } else if candle.high < candle.low {
                format!("high {} below low {}", candle.high, candle.low)
            } else {
                "open/close outside high-low range or non-positive price".to_string()
            };
            return Err(SmcError::MalformedCandle { index, reason });
        }
        if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
            return Err(SmcError::NonMonotonicTimestamp { index });
        }
    }

    Ok(())
}
