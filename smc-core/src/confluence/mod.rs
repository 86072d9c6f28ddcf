//! Confluence aggregation: turns a [`MarketStructure`] snapshot into a
//! scored, explainable [`ConfluenceResult`].
//!
//! Two policies share one implementation:
//! - `Strict`: killzone, impulsive move and higher-timeframe checks are hard
//!   gates evaluated in that order, followed by the confluence threshold.
//!   Only the first failure is reported.
//! - `Weighted`: every tag is recorded, the killzone acts as a penalty and
//!   the impulsive-move gate is recorded without stopping evaluation.

pub mod structure;

pub use structure::MarketStructure;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PolicyMode, SmcConfig};
use crate::detectors::{self, Zone};
use crate::domain::{Candle, ConfluenceTag, LiquiditySide, RejectionReason, Side, Timeframe};
use crate::model::{Features, SignalModel};

/// Upper bound of the integer score.
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    /// Counted tags after penalties, within `0..=5`.
    pub score: u8,
    /// Sum of fired weights, capped at the configured maximum.
    pub weighted_score: f64,
    /// Fired tags in fixed category order.
    pub confluences: Vec<ConfluenceTag>,
    pub zone: Option<Zone>,
    pub equilibrium: Option<f64>,
    pub side: Option<Side>,
    /// Hard gates that failed, in evaluation order.
    pub failed_gates: Vec<RejectionReason>,
}

impl ConfluenceResult {
    pub fn has(&self, tag: ConfluenceTag) -> bool {
        self.confluences.contains(&tag)
    }

    pub fn first_failed_gate(&self) -> Option<RejectionReason> {
        self.failed_gates.first().copied()
    }

    /// Human-readable explanation, e.g. `buy: bos+order_block+zone`.
    pub fn reason(&self) -> String {
        let tags = if self.confluences.is_empty() {
            "none".to_string()
        } else {
            self.confluences
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join("+")
        };
        match self.side {
            Some(side) => format!("{side}: {tags}"),
            None => format!("no bias: {tags}"),
        }
    }
}

/// Inputs the aggregator needs besides the structure snapshot.
pub struct AggregateContext<'a> {
    pub candles: &'a [Candle],
    pub timeframe: Timeframe,
    pub model: Option<&'a dyn SignalModel>,
}

/// Fire the confluence tags for `side`, in fixed category order.
pub fn fired_tags(
    ctx: &AggregateContext<'_>,
    structure: &MarketStructure,
    side: Side,
    config: &SmcConfig,
) -> Vec<ConfluenceTag> {
    let Some(last) = ctx.candles.last() else {
        return Vec::new();
    };
    let n = ctx.candles.len();
    let close = last.close;
    let bias = side.bias();
    let d = &config.detectors;

    let bos = structure.bos.is_some_and(|b| b.bias == bias);
    let block = structure.block_containing(bias, close);
    let fvg = detectors::has_recent_gap(&structure.fair_value_gaps, bias, n, d.fvg_recent);
    let (target_side, swept_side) = match side {
        Side::Buy => (LiquiditySide::Highs, LiquiditySide::Lows),
        Side::Sell => (LiquiditySide::Lows, LiquiditySide::Highs),
    };

    let mut tags = Vec::new();
    let mut fire = |tag: ConfluenceTag, fired: bool| {
        if fired {
            tags.push(tag);
        }
    };

    fire(ConfluenceTag::BreakOfStructure, bos);
    fire(ConfluenceTag::OrderBlock, block.is_some());
    fire(ConfluenceTag::FairValueGap, fvg);
    fire(
        ConfluenceTag::Liquidity,
        detectors::has_target_liquidity(&structure.liquidity_pools, target_side, close),
    );
    fire(
        ConfluenceTag::EqualHighsLows,
        detectors::has_recent_sweep(&structure.inducements, swept_side, n, d.inducement_recent),
    );
    fire(
        ConfluenceTag::Zone,
        structure.zone.is_some_and(|z| z.zone.favours(side)),
    );
    fire(
        ConfluenceTag::HigherTimeframe,
        config.htf.enabled && detectors::htf_confirms(&structure.htf, bias),
    );
    fire(
        ConfluenceTag::SmtDivergence,
        structure.smt.is_some_and(|s| s.bias() == bias),
    );
    fire(
        ConfluenceTag::Mitigation,
        structure.mitigations.iter().any(|m| m.bias == bias),
    );
    fire(
        ConfluenceTag::Breaker,
        structure
            .breakers
            .iter()
            .any(|b| b.bias == bias && b.range.overlaps(last.low, last.high)),
    );
    let model_agrees = ctx.model.is_some_and(|model| {
        Features::extract(ctx.candles, ctx.timeframe, block, bos, fvg)
            .and_then(|features| model.predict(&features))
            .is_some_and(|p| p.side == side && p.probability >= config.model.min_probability)
    });
    fire(ConfluenceTag::Model, model_agrees);
    fire(ConfluenceTag::Killzone, structure.in_killzone());

    tags
}

/// Score a window under the configured policy.
pub fn aggregate(
    ctx: &AggregateContext<'_>,
    structure: &MarketStructure,
    config: &SmcConfig,
) -> ConfluenceResult {
    let scoring = &config.scoring;
    let in_killzone = structure.in_killzone();
    let side = ctx
        .candles
        .last()
        .and_then(|c| structure.bias(c.close))
        .map(Side::from_bias);

    let confluences = side
        .map(|s| fired_tags(ctx, structure, s, config))
        .unwrap_or_default();

    let counted = confluences.iter().filter(|t| t.is_counted()).count();
    let raw_weight: f64 = confluences.iter().map(|&t| scoring.weights.weight(t)).sum();

    let mut failed_gates = Vec::new();
    let (score, weighted_score) = match scoring.mode {
        PolicyMode::Strict => {
            let score = counted.min(MAX_SCORE as usize) as u8;
            let gate = strict_gate(structure, side, score, config);
            failed_gates.extend(gate);
            (score, raw_weight)
        }
        PolicyMode::Weighted => {
            if config.detectors.require_impulsive_move && !structure.impulsive {
                failed_gates.push(RejectionReason::NotImpulsiveMove);
            }
            let (penalty, factor) = if in_killzone {
                (0, 1.0)
            } else {
                (scoring.off_session_penalty as usize, scoring.off_session_factor)
            };
            let score = counted.saturating_sub(penalty).min(MAX_SCORE as usize) as u8;
            (score, raw_weight * factor)
        }
    };

    let result = ConfluenceResult {
        score,
        weighted_score: weighted_score.min(scoring.max_weighted_score).max(0.0),
        confluences,
        zone: structure.zone.map(|z| z.zone),
        equilibrium: structure.equilibrium(),
        side,
        failed_gates,
    };

    debug!(
        side = ?result.side,
        score = result.score,
        weighted_score = result.weighted_score,
        confluences = %result.reason(),
        failed_gates = ?result.failed_gates,
        "confluence aggregated"
    );
    result
}

/// First failing strict gate, in evaluation order.
fn strict_gate(
    structure: &MarketStructure,
    side: Option<Side>,
    score: u8,
    config: &SmcConfig,
) -> Option<RejectionReason> {
    if !structure.in_killzone() {
        return Some(RejectionReason::OutsideKillzone);
    }
    if config.detectors.require_impulsive_move && !structure.impulsive {
        return Some(RejectionReason::NotImpulsiveMove);
    }
    let Some(side) = side else {
        return Some(RejectionReason::InsufficientConfluence);
    };
    if config.htf.enabled && !detectors::htf_confirms(&structure.htf, side.bias()) {
        return Some(RejectionReason::HtfConfluenceFailed);
    }
    if score < config.scoring.actionable_threshold {
        return Some(RejectionReason::InsufficientConfluence);
    }
    None
}
