//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR here is the rolling mean of true range with a partial window at the
//! start (the first value is defined as soon as one candle exists), which is
//! what stop-loss buffering needs on short windows.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from candles.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = candles[0].high - candles[0].low;

    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let tr = true_range(candles);
        let mut result = vec![f64::NAN; tr.len()];
        let mut sum = 0.0;
        for i in 0..tr.len() {
            sum += tr[i];
            if i >= self.period {
                sum -= tr[i - self.period];
            }
            let count = (i + 1).min(self.period);
            result[i] = sum / count as f64;
        }
        result
    }
}

/// ATR at the last candle, or 0.0 for an empty window.
pub fn atr_last(candles: &[Candle], period: usize) -> f64 {
    Atr::new(period)
        .compute(candles)
        .last()
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candles = make_ohlc(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_partial_window_then_rolling() {
        let candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
        ]);
        let result = Atr::new(3).compute(&candles);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 9.0, DEFAULT_EPSILON);
        assert_approx(result[2], 9.0, DEFAULT_EPSILON);
        // mean(8, 9, 6)
        assert_approx(result[3], 23.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_last_of_empty_is_zero() {
        assert_eq!(atr_last(&[], 14), 0.0);
    }

    #[test]
    fn atr_name() {
        assert_eq!(Atr::new(14).name(), "atr_14");
    }
}
