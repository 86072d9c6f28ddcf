//! Resting liquidity: clusters of nearly equal highs or lows.

use crate::domain::{Candle, LiquidityPool, LiquiditySide};

/// Scan every rolling `lookback` window. When the spread of the window's
/// highs (or lows) is within `close[i] * tolerance`, the extreme is recorded
/// as a pool. Levels are rounded to `precision` decimals and kept once per
/// side, at the first index they were seen.
pub fn detect_liquidity_pools(
    candles: &[Candle],
    lookback: usize,
    tolerance: f64,
    precision: u32,
) -> Vec<LiquidityPool> {
    let n = candles.len();
    if lookback == 0 || n <= lookback {
        return Vec::new();
    }

    let mut pools: Vec<LiquidityPool> = Vec::new();
    for i in lookback..n {
        let window = &candles[i - lookback..i];
        let band = candles[i].close * tolerance;

        let (mut hi_max, mut hi_min) = (f64::NEG_INFINITY, f64::INFINITY);
        let (mut lo_max, mut lo_min) = (f64::NEG_INFINITY, f64::INFINITY);
        for c in window {
            hi_max = hi_max.max(c.high);
            hi_min = hi_min.min(c.high);
            lo_max = lo_max.max(c.low);
            lo_min = lo_min.min(c.low);
        }

        if hi_max - hi_min <= band {
            push_unique(&mut pools, LiquiditySide::Highs, round_to(hi_max, precision), i);
        }
        if lo_max - lo_min <= band {
            push_unique(&mut pools, LiquiditySide::Lows, round_to(lo_min, precision), i);
        }
    }
    pools
}

fn push_unique(pools: &mut Vec<LiquidityPool>, side: LiquiditySide, level: f64, index: usize) {
    if !pools.iter().any(|p| p.side == side && p.level == level) {
        pools.push(LiquidityPool { side, level, index });
    }
}

/// Round half away from zero to `precision` decimals.
pub(crate) fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// True when a pool sits on the target side of `close`: buy-side liquidity
/// above price for longs, sell-side below for shorts.
pub fn has_target_liquidity(pools: &[LiquidityPool], side: LiquiditySide, close: f64) -> bool {
    pools.iter().any(|p| {
        p.side == side
            && match side {
                LiquiditySide::Highs => p.level > close,
                LiquiditySide::Lows => p.level < close,
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc;

    fn flat_tops(n: usize) -> Vec<(f64, f64, f64, f64)> {
        // Highs identical, lows spread out.
        (0..n)
            .map(|i| (100.0, 101.0, 98.0 - i as f64 * 0.5, 100.0))
            .collect()
    }

    #[test]
    fn equal_highs_form_a_pool() {
        let candles = make_ohlc(&flat_tops(6));
        let pools = detect_liquidity_pools(&candles, 5, 0.0005, 5);
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].side, LiquiditySide::Highs);
        assert_eq!(pools[0].level, 101.0);
        assert_eq!(pools[0].index, 5);
    }

    #[test]
    fn pools_are_deduplicated_per_side() {
        let candles = make_ohlc(&flat_tops(12));
        let pools = detect_liquidity_pools(&candles, 5, 0.0005, 5);
        let highs = pools.iter().filter(|p| p.side == LiquiditySide::Highs).count();
        assert_eq!(highs, 1);
        assert!(pools.iter().all(|p| p.side == LiquiditySide::Highs));
    }

    #[test]
    fn equal_lows_form_a_pool() {
        let data: Vec<_> = (0..6)
            .map(|i| (100.0, 101.0 + i as f64, 99.0, 100.0))
            .collect();
        let pools = detect_liquidity_pools(&make_ohlc(&data), 5, 0.0005, 5);
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].side, LiquiditySide::Lows);
        assert_eq!(pools[0].level, 99.0);
    }

    #[test]
    fn window_not_longer_than_lookback_yields_nothing() {
        let candles = make_ohlc(&flat_tops(5));
        assert!(detect_liquidity_pools(&candles, 5, 0.0005, 5).is_empty());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.234_567_8, 5), 1.23457);
        assert_eq!(round_to(101.0, 5), 101.0);
    }

    #[test]
    fn target_side_filter() {
        let pools = vec![
            LiquidityPool {
                side: LiquiditySide::Highs,
                level: 105.0,
                index: 3,
            },
            LiquidityPool {
                side: LiquiditySide::Lows,
                level: 101.0,
                index: 4,
            },
        ];
        assert!(has_target_liquidity(&pools, LiquiditySide::Highs, 100.0));
        assert!(!has_target_liquidity(&pools, LiquiditySide::Highs, 106.0));
        assert!(!has_target_liquidity(&pools, LiquiditySide::Lows, 100.0));
        assert!(has_target_liquidity(&pools, LiquiditySide::Lows, 102.0));
    }
}
