//! Order block detection.
//!
//! Two methods are supported:
//! - `ThreeCandle`: the last opposing candle before a two-candle impulse
//!   (down-up-up is bullish, up-down-down is bearish). The block spans the
//!   opposing candle's high/low.
//! - `BodyImpulse`: a single large-bodied candle, body >= `min_body_ratio` of
//!   its range and >= `min_body_fraction` of its close.
//!
//! After detection, each block is walked forward: the first later close
//! beyond the far boundary (below `low` for bullish, above `high` for
//! bearish) marks it invalidated.

use crate::config::{DetectorConfig, OrderBlockMethod};
use crate::domain::{Bias, BlockState, Candle, OrderBlock, PriceRange};

/// Detect order blocks with the configured method and resolve their state.
pub fn detect_order_blocks(candles: &[Candle], config: &DetectorConfig) -> Vec<OrderBlock> {
    let blocks = match config.order_block_method {
        OrderBlockMethod::ThreeCandle => three_candle_blocks(candles, config.order_block_lookback),
        OrderBlockMethod::BodyImpulse => body_impulse_blocks(
            candles,
            config.order_block_lookback,
            config.ob_min_body_ratio,
            config.ob_min_body_fraction,
        ),
    };
    resolve_state(blocks, candles)
}

/// Three-candle pattern over the trailing `lookback` candles.
///
/// The impulse must be complete before the current (last) candle, so the
/// second impulse candle is at most `len - 2`.
pub fn three_candle_blocks(candles: &[Candle], lookback: usize) -> Vec<OrderBlock> {
    let n = candles.len();
    if n < 4 {
        return Vec::new();
    }
    let start = n.saturating_sub(lookback).max(2);
    let end = n - 2;

    let mut blocks = Vec::new();
    for i in start..end {
        let (prev, cur, next) = (&candles[i - 1], &candles[i], &candles[i + 1]);
        let bias = if prev.is_bearish() && cur.is_bullish() && next.is_bullish() {
            Bias::Bullish
        } else if prev.is_bullish() && cur.is_bearish() && next.is_bearish() {
            Bias::Bearish
        } else {
            continue;
        };
        blocks.push(OrderBlock {
            bias,
            range: PriceRange::new(prev.high, prev.low),
            index: i - 1,
            state: BlockState::Active,
        });
    }
    blocks
}

/// Large-body candles among the trailing `lookback` candles, excluding the
/// current one. A bearish body gives a bearish block and vice versa.
pub fn body_impulse_blocks(
    candles: &[Candle],
    lookback: usize,
    min_body_ratio: f64,
    min_body_fraction: f64,
) -> Vec<OrderBlock> {
    let n = candles.len();
    if n < 2 {
        return Vec::new();
    }
    let start = n.saturating_sub(lookback);

    candles[start..n - 1]
        .iter()
        .enumerate()
        .filter_map(|(offset, c)| {
            let range = c.range();
            let body = c.body();
            if range <= 0.0 || body < min_body_ratio * range || body < min_body_fraction * c.close {
                return None;
            }
            let bias = if c.is_bearish() {
                Bias::Bearish
            } else {
                Bias::Bullish
            };
            Some(OrderBlock {
                bias,
                range: PriceRange::new(c.high, c.low),
                index: start + offset,
                state: BlockState::Active,
            })
        })
        .collect()
}

/// Walk every block forward and record the first close through its far
/// boundary.
pub fn resolve_state(mut blocks: Vec<OrderBlock>, candles: &[Candle]) -> Vec<OrderBlock> {
    for block in &mut blocks {
        let broken = candles
            .iter()
            .enumerate()
            .skip(block.index + 1)
            .find(|(_, c)| match block.bias {
                Bias::Bullish => c.close < block.range.low,
                Bias::Bearish => c.close > block.range.high,
            });
        if let Some((at, _)) = broken {
            block.state = BlockState::Invalidated { at };
        }
    }
    blocks
}

/// The most recent active block whose range contains `price`.
pub fn active_block_containing(blocks: &[OrderBlock], price: f64) -> Option<&OrderBlock> {
    blocks
        .iter()
        .rev()
        .find(|b| b.is_active() && b.range.contains(price))
}
