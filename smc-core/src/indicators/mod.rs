//! Indicators: pure functions from candle history to numeric series.
//!
//! Every indicator returns a `Vec<f64>` of the same length as its input, with
//! `f64::NAN` in the warmup region. No value at index t may depend on candles
//! after t.

pub mod atr;
pub mod ema;
pub mod sma;

pub use atr::{atr_last, true_range, Atr};
pub use ema::{ema_of_series, Ema};
pub use sma::{sma_of_series, Sma};

use crate::domain::Candle;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at candle t may depend on price data from candle t+1
/// or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of candles needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the entire candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create synthetic 5-minute candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            candle_at(i, open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect()
}

/// One synthetic 5-minute candle at position `i` from 2024-01-02 00:00 UTC.
#[cfg(test)]
pub fn candle_at(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    Candle {
        timestamp: base + chrono::Duration::minutes(5 * i as i64),
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Build candles from `(open, high, low, close)` tuples.
#[cfg(test)]
pub fn make_ohlc(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    data.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| candle_at(i, o, h, l, c))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
