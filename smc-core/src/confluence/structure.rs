//! Snapshot of every detector's output for one window.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::SmcConfig;
use crate::detectors::{self, HtfReading, SmtDivergence, ZoneReading};
use crate::domain::{
    Bias, BreakOfStructure, BreakerBlock, Candle, FairValueGap, Inducement, LiquidityPool,
    MitigationBlock, OrderBlock, Side, StructuralEvent,
};

/// Everything the detectors observed in one window. Built fresh per
/// evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub bos: Option<BreakOfStructure>,
    pub liquidity_pools: Vec<LiquidityPool>,
    pub inducements: Vec<Inducement>,
    pub mitigations: Vec<MitigationBlock>,
    pub breakers: Vec<BreakerBlock>,
    pub zone: Option<ZoneReading>,
    pub smt: Option<SmtDivergence>,
    pub impulsive: bool,
    /// Name of the session containing the last candle, if any.
    pub session: Option<String>,
    pub htf: Vec<HtfReading>,
}

impl MarketStructure {
    /// Run every detector over `candles`. `reference` feeds SMT divergence.
    pub fn scan(candles: &[Candle], reference: Option<&[Candle]>, config: &SmcConfig) -> Self {
        let d = &config.detectors;
        let increment = config.instrument.price_increment;

        let order_blocks = detectors::detect_order_blocks(candles, d);
        let bos = detectors::detect_bos(candles, d.bos_lookback);
        let mitigations = detectors::detect_mitigations(
            candles,
            bos.as_ref(),
            &order_blocks,
            d.mitigation_recent,
        );
        let breakers = detectors::detect_breakers(&order_blocks);

        let structure = Self {
            fair_value_gaps: detectors::detect_fvgs(candles),
            liquidity_pools: detectors::detect_liquidity_pools(
                candles,
                d.liquidity_lookback,
                d.liquidity_tolerance,
                d.liquidity_precision,
            ),
            inducements: detectors::detect_inducements(
                candles,
                d.equal_level_tolerance_units * increment,
            ),
            zone: detectors::premium_discount(candles, d.zone_lookback, d.equilibrium_band),
            smt: reference.and_then(|r| detectors::detect_smt(candles, r, d.smt_lookback)),
            impulsive: detectors::is_impulsive_move(candles, increment, d.min_impulse_units),
            session: candles.last().and_then(|c| {
                detectors::active_session(c.timestamp, &config.killzones.sessions)
                    .map(|s| s.name.clone())
            }),
            htf: if config.htf.enabled {
                detectors::htf_readings(candles, &config.htf)
            } else {
                Vec::new()
            },
            order_blocks,
            bos,
            mitigations,
            breakers,
        };

        trace!(
            order_blocks = structure.order_blocks.len(),
            fvgs = structure.fair_value_gaps.len(),
            bos = structure.bos.is_some(),
            pools = structure.liquidity_pools.len(),
            inducements = structure.inducements.len(),
            mitigations = structure.mitigations.len(),
            breakers = structure.breakers.len(),
            "market structure scanned"
        );
        structure
    }

    pub fn in_killzone(&self) -> bool {
        self.session.is_some()
    }

    pub fn equilibrium(&self) -> Option<f64> {
        self.zone.map(|z| z.equilibrium)
    }

    /// Structural bias: break of structure first, then the most recent
    /// active order block containing `close`, then SMT divergence.
    pub fn bias(&self, close: f64) -> Option<Bias> {
        self.bos
            .map(|b| b.bias)
            .or_else(|| {
                detectors::active_block_containing(&self.order_blocks, close).map(|b| b.bias)
            })
            .or_else(|| self.smt.map(SmtDivergence::bias))
    }

    /// Most recent active block of `bias` whose range contains `price`.
    pub fn block_containing(&self, bias: Bias, price: f64) -> Option<&OrderBlock> {
        self.order_blocks
            .iter()
            .rev()
            .find(|b| b.bias == bias && b.is_active() && b.range.contains(price))
    }

    /// Block used to anchor a stop: the most recent active block matching
    /// the side whose far boundary lies beyond `entry`.
    pub fn stop_block(&self, side: Side, entry: f64) -> Option<&OrderBlock> {
        let bias = side.bias();
        self.order_blocks.iter().rev().find(|b| {
            b.bias == bias
                && b.is_active()
                && match side {
                    Side::Buy => b.range.low < entry,
                    Side::Sell => b.range.high > entry,
                }
        })
    }

    /// All events as one list ordered by index.
    pub fn events(&self) -> Vec<StructuralEvent> {
        let mut events: Vec<StructuralEvent> = self
            .order_blocks
            .iter()
            .copied()
            .map(StructuralEvent::OrderBlock)
            .chain(self.fair_value_gaps.iter().copied().map(StructuralEvent::FairValueGap))
            .chain(self.bos.into_iter().map(StructuralEvent::BreakOfStructure))
            .chain(self.liquidity_pools.iter().copied().map(StructuralEvent::LiquidityPool))
            .chain(self.inducements.iter().copied().map(StructuralEvent::Inducement))
            .chain(self.mitigations.iter().copied().map(StructuralEvent::MitigationBlock))
            .chain(self.breakers.iter().copied().map(StructuralEvent::BreakerBlock))
            .collect();
        events.sort_by_key(StructuralEvent::index);
        events
    }
}
