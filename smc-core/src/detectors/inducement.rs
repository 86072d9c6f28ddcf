//! Equal highs/lows inducement: two nearly equal extremes followed by a
//! candle that sweeps beyond them.

use crate::domain::{Candle, Inducement, LiquiditySide};

/// `tolerance` is an absolute price distance.
pub fn detect_inducements(candles: &[Candle], tolerance: f64) -> Vec<Inducement> {
    let mut found = Vec::new();
    for i in 2..candles.len() {
        let (a, b, c) = (&candles[i - 2], &candles[i - 1], &candles[i]);
        if (b.high - a.high).abs() <= tolerance && c.high > b.high {
            found.push(Inducement {
                side: LiquiditySide::Highs,
                level: b.high,
                index: i,
            });
        }
        if (b.low - a.low).abs() <= tolerance && c.low < b.low {
            found.push(Inducement {
                side: LiquiditySide::Lows,
                level: b.low,
                index: i,
            });
        }
    }
    found
}

/// True when a sweep of `side` happened within the last `recent` candles.
pub fn has_recent_sweep(
    found: &[Inducement],
    side: LiquiditySide,
    len: usize,
    recent: usize,
) -> bool {
    let cutoff = len.saturating_sub(recent);
    found.iter().any(|f| f.side == side && f.index >= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc;

    #[test]
    fn equal_lows_swept() {
        let candles = make_ohlc(&[
            (100.0, 101.0, 99.00, 100.5),
            (100.5, 101.5, 99.02, 101.0),
            (101.0, 101.2, 98.50, 100.8),
        ]);
        let found = detect_inducements(&candles, 0.05);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].side, LiquiditySide::Lows);
        assert_eq!(found[0].level, 99.02);
        assert_eq!(found[0].index, 2);
    }

    #[test]
    fn equal_highs_swept() {
        let candles = make_ohlc(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 102.0, 100.0, 100.5),
            (100.5, 102.4, 100.2, 101.0),
        ]);
        let found = detect_inducements(&candles, 0.05);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].side, LiquiditySide::Highs);
    }

    #[test]
    fn unequal_extremes_are_ignored() {
        let candles = make_ohlc(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 103.0, 100.0, 100.5),
            (100.5, 104.0, 100.2, 101.0),
        ]);
        assert!(detect_inducements(&candles, 0.05).is_empty());
    }

    #[test]
    fn recency() {
        let found = vec![Inducement {
            side: LiquiditySide::Lows,
            level: 99.0,
            index: 5,
        }];
        assert!(has_recent_sweep(&found, LiquiditySide::Lows, 10, 5));
        assert!(!has_recent_sweep(&found, LiquiditySide::Lows, 11, 5));
        assert!(!has_recent_sweep(&found, LiquiditySide::Highs, 10, 5));
    }
}
