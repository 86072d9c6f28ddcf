//! Momentum check on the last completed candle.

use crate::domain::Candle;

/// True when the candle before the current one spans at least
/// `min_units` price increments from low to high.
pub fn is_impulsive_move(candles: &[Candle], price_increment: f64, min_units: f64) -> bool {
    let n = candles.len();
    if n < 2 || !(price_increment > 0.0) {
        return false;
    }
    candles[n - 2].range() / price_increment >= min_units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc;

    #[test]
    fn prior_candle_range_counts() {
        let candles = make_ohlc(&[
            (100.0, 101.5, 100.0, 101.0), // range 1.5 = 150 units at 0.01
            (101.0, 101.1, 100.9, 101.0),
        ]);
        assert!(is_impulsive_move(&candles, 0.01, 150.0));
        assert!(!is_impulsive_move(&candles, 0.01, 151.0));
        assert!(!is_impulsive_move(&candles, 1.0, 150.0));
    }

    #[test]
    fn current_candle_is_ignored() {
        let candles = make_ohlc(&[
            (100.0, 100.1, 99.9, 100.0),
            (100.0, 110.0, 90.0, 105.0),
        ]);
        assert!(!is_impulsive_move(&candles, 0.01, 150.0));
    }

    #[test]
    fn short_window_fails() {
        let candles = make_ohlc(&[(100.0, 200.0, 50.0, 150.0)]);
        assert!(!is_impulsive_move(&candles, 0.01, 1.0));
        assert!(!is_impulsive_move(&[], 0.01, 1.0));
    }
}
