//! Fair value gaps: three-candle imbalances where the outer candles' wicks
//! do not overlap.

use crate::domain::{Bias, Candle, FairValueGap};

/// Every gap in the window, in index order.
pub fn detect_fvgs(candles: &[Candle]) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();
    for i in 2..candles.len() {
        let (first, third) = (&candles[i - 2], &candles[i]);
        if third.low > first.high {
            gaps.push(FairValueGap {
                bias: Bias::Bullish,
                top: third.low,
                bottom: first.high,
                index: i,
            });
        } else if third.high < first.low {
            gaps.push(FairValueGap {
                bias: Bias::Bearish,
                top: first.low,
                bottom: third.high,
                index: i,
            });
        }
    }
    gaps
}

/// True when a gap of `bias` formed within the last `recent` candles.
pub fn has_recent_gap(gaps: &[FairValueGap], bias: Bias, len: usize, recent: usize) -> bool {
    let cutoff = len.saturating_sub(recent);
    gaps.iter().any(|g| g.bias == bias && g.index >= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc;

    #[test]
    fn bullish_gap() {
        let candles = make_ohlc(&[
            (100.0, 101.0, 99.0, 100.8),
            (100.8, 104.0, 100.5, 103.8),
            (103.8, 105.0, 102.0, 104.5),
        ]);
        let gaps = detect_fvgs(&candles);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].bias, Bias::Bullish);
        assert_eq!(gaps[0].top, 102.0);
        assert_eq!(gaps[0].bottom, 101.0);
        assert_eq!(gaps[0].index, 2);
    }

    #[test]
    fn bearish_gap() {
        let candles = make_ohlc(&[
            (100.0, 101.0, 99.0, 99.2),
            (99.2, 99.5, 96.0, 96.2),
            (96.2, 97.5, 95.0, 95.5),
        ]);
        let gaps = detect_fvgs(&candles);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].bias, Bias::Bearish);
        assert_eq!(gaps[0].top, 99.0);
        assert_eq!(gaps[0].bottom, 97.5);
    }

    #[test]
    fn touching_wicks_are_not_a_gap() {
        let candles = make_ohlc(&[
            (100.0, 101.0, 99.0, 100.8),
            (100.8, 104.0, 100.5, 103.8),
            (103.8, 105.0, 101.0, 104.5),
        ]);
        assert!(detect_fvgs(&candles).is_empty());
    }

    #[test]
    fn fewer_than_three_candles() {
        let candles = make_ohlc(&[(100.0, 101.0, 99.0, 100.0); 2]);
        assert!(detect_fvgs(&candles).is_empty());
    }

    #[test]
    fn recency_filter() {
        let gaps = vec![FairValueGap {
            bias: Bias::Bullish,
            top: 2.0,
            bottom: 1.0,
            index: 10,
        }];
        assert!(has_recent_gap(&gaps, Bias::Bullish, 50, 50));
        assert!(has_recent_gap(&gaps, Bias::Bullish, 60, 50));
        assert!(!has_recent_gap(&gaps, Bias::Bullish, 61, 50));
        assert!(!has_recent_gap(&gaps, Bias::Bearish, 50, 50));
    }
}
