//! Break of structure.
//!
//! The latest close is compared against the highest high and lowest low of
//! the `lookback` candles before it. The window excludes the latest candle,
//! so a bar can never break its own extreme.

use crate::domain::{Bias, BreakOfStructure, Candle};

/// Detect a break of structure at the last candle. Needs `lookback + 1`
/// candles.
pub fn detect_bos(candles: &[Candle], lookback: usize) -> Option<BreakOfStructure> {
    let n = candles.len();
    if lookback == 0 || n < lookback + 1 {
        return None;
    }
    let last = &candles[n - 1];
    let prior = &candles[n - 1 - lookback..n - 1];

    let swing_high = prior.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let swing_low = prior.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    let (bias, level) = if last.close > swing_high {
        (Bias::Bullish, swing_high)
    } else if last.close < swing_low {
        (Bias::Bearish, swing_low)
    } else {
        return None;
    };

    Some(BreakOfStructure {
        bias,
        level,
        close: last.close,
        index: n - 1,
    })
}
