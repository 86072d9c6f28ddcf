//! Look-ahead contamination tests for indicators and detectors.
//!
//! No value or event at candle t may depend on candles after t.
//!
//! Method: run on a truncated series (candles 0..100) and the full series
//! (candles 0..200). Everything the truncated run reports must appear
//! unchanged in the full run.

use chrono::{Duration, TimeZone, Utc};

use smc_core::detectors::{
    detect_fvgs, detect_inducements, detect_liquidity_pools, resolve_state, three_candle_blocks,
};
use smc_core::domain::{BlockState, Candle};
use smc_core::indicators::{Atr, Ema, Indicator, Sma};

const FULL: usize = 200;
const CUT: usize = 100;

/// Deterministic pseudo-random walk (LCG) with mixed candle directions.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut price = 100.0_f64;
    let mut seed: u64 = 42;

    (0..n)
        .map(|i| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let change = (((seed >> 33) % 200) as f64 - 100.0) * 0.03; // -3.0 to +3.0
            let wick = ((seed >> 17) % 100) as f64 * 0.01;

            let open = price;
            price = (price + change).max(10.0);
            let close = price;
            Candle {
                timestamp: base + Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + wick,
                low: open.min(close) - wick,
                close,
                volume: 1000.0 + i as f64,
            }
        })
        .collect()
}

// ── Indicators ───────────────────────────────────────────────────────

fn assert_no_lookahead(indicator: &dyn Indicator, full: &[Candle]) {
    let truncated = indicator.compute(&full[..CUT]);
    let complete = indicator.compute(full);
    assert_eq!(truncated.len(), CUT, "{}: length mismatch", indicator.name());

    for (i, (a, b)) in truncated.iter().zip(&complete).enumerate() {
        if a.is_nan() && b.is_nan() {
            continue;
        }
        assert!(
            (a - b).abs() < 1e-10,
            "{}: candle {i} differs ({a} vs {b})",
            indicator.name()
        );
    }
}

#[test]
fn sma_no_lookahead() {
    assert_no_lookahead(&Sma::new(20), &make_test_candles(FULL));
}

#[test]
fn ema_no_lookahead() {
    assert_no_lookahead(&Ema::new(20), &make_test_candles(FULL));
}

#[test]
fn atr_no_lookahead() {
    assert_no_lookahead(&Atr::new(14), &make_test_candles(FULL));
}

// ── Detectors ────────────────────────────────────────────────────────

#[test]
fn fair_value_gaps_no_lookahead() {
    let candles = make_test_candles(FULL);
    let truncated = detect_fvgs(&candles[..CUT]);
    let complete: Vec<_> = detect_fvgs(&candles)
        .into_iter()
        .filter(|g| g.index < CUT)
        .collect();
    assert!(!truncated.is_empty(), "fixture should produce gaps");
    assert_eq!(truncated, complete);
}

#[test]
fn inducements_no_lookahead() {
    let candles = make_test_candles(FULL);
    let truncated = detect_inducements(&candles[..CUT], 0.5);
    let complete: Vec<_> = detect_inducements(&candles, 0.5)
        .into_iter()
        .filter(|f| f.index < CUT)
        .collect();
    assert_eq!(truncated, complete);
}

#[test]
fn liquidity_pools_no_lookahead() {
    let candles = make_test_candles(FULL);
    let truncated = detect_liquidity_pools(&candles[..CUT], 5, 0.02, 5);
    let complete: Vec<_> = detect_liquidity_pools(&candles, 5, 0.02, 5)
        .into_iter()
        .filter(|p| p.index < CUT)
        .collect();
    assert_eq!(truncated, complete);
}

#[test]
fn order_blocks_no_lookahead() {
    let candles = make_test_candles(FULL);
    // A block at index i is confirmed by i+1 and i+2 and never by the
    // current candle, so the truncated run sees blocks up to CUT - 4.
    let truncated = three_candle_blocks(&candles[..CUT], FULL);
    let complete: Vec<_> = three_candle_blocks(&candles, FULL)
        .into_iter()
        .filter(|b| b.index + 4 <= CUT)
        .collect();
    assert!(!truncated.is_empty(), "fixture should produce blocks");
    assert_eq!(truncated, complete);
}

#[test]
fn block_invalidation_is_not_revised() {
    let candles = make_test_candles(FULL);
    let truncated = resolve_state(three_candle_blocks(&candles[..CUT], FULL), &candles[..CUT]);
    let complete = resolve_state(three_candle_blocks(&candles, FULL), &candles);

    for block in truncated {
        let later = complete
            .iter()
            .find(|b| b.index == block.index && b.bias == block.bias)
            .expect("block present in full run");
        if let BlockState::Invalidated { at } = block.state {
            assert_eq!(later.state, BlockState::Invalidated { at });
        }
    }
}
