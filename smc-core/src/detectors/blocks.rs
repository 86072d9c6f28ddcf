//! Mitigation and breaker blocks, both derived from resolved order blocks.

use crate::domain::{
    BlockState, BreakOfStructure, BreakerBlock, Candle, MitigationBlock, OrderBlock,
};

/// Active order blocks formed before the break of structure that the last
/// `recent` candles have traded back into.
pub fn detect_mitigations(
    candles: &[Candle],
    bos: Option<&BreakOfStructure>,
    blocks: &[OrderBlock],
    recent: usize,
) -> Vec<MitigationBlock> {
    let Some(bos) = bos else {
        return Vec::new();
    };
    if candles.is_empty() || recent == 0 {
        return Vec::new();
    }

    let tail = &candles[candles.len().saturating_sub(recent)..];
    let low = tail.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = tail.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);

    blocks
        .iter()
        .filter(|b| b.is_active() && b.index < bos.index && b.range.overlaps(low, high))
        .map(|b| MitigationBlock {
            bias: b.bias,
            range: b.range,
            index: b.index,
            bos_index: bos.index,
        })
        .collect()
}

/// Every invalidated order block, with its polarity flipped.
pub fn detect_breakers(blocks: &[OrderBlock]) -> Vec<BreakerBlock> {
    blocks
        .iter()
        .filter_map(|b| match b.state {
            BlockState::Invalidated { at } => Some(BreakerBlock {
                bias: b.bias.flip(),
                range: b.range,
                index: at,
                origin_index: b.index,
            }),
            BlockState::Active => None,
        })
        .collect()
}
