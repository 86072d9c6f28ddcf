//! TradeCandidate: an accepted, fully parameterized trade signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CandidateId;
use super::signal::{Category, ConfluenceTag, Side};
use super::timeframe::Timeframe;

/// A scored trade signal with concrete entry, stop and targets.
///
/// Immutable once emitted. The side/price ordering invariant
/// (`buy ⇒ stop < entry < target`, `sell ⇒ target < entry < stop`) holds for
/// every candidate the pipeline accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCandidate {
    pub id: CandidateId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub side: Side,
    pub entry: f64,
    pub stop_loss: f64,
    /// Primary target at the configured risk-reward multiple.
    pub take_profit: f64,
    /// Target ladder, nearest first.
    pub take_profits: Vec<f64>,
    pub risk_reward: f64,
    /// Weighted confluence score (0.0 to 0.99).
    pub confidence: f64,
    pub category: Category,
    pub score: u8,
    pub confluences: Vec<ConfluenceTag>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl TradeCandidate {
    /// True when stop, entry and target are ordered consistently with the side.
    pub fn levels_are_ordered(&self) -> bool {
        levels_are_ordered(self.side, self.entry, self.stop_loss, self.take_profit)
    }
}

/// Side/price ordering check shared by the calculator and the candidate.
pub fn levels_are_ordered(side: Side, entry: f64, stop_loss: f64, take_profit: f64) -> bool {
    match side {
        Side::Buy => stop_loss < entry && entry < take_profit,
        Side::Sell => take_profit < entry && entry < stop_loss,
    }
}

/// Reward distance over risk distance. `None` when the risk distance is zero
/// or any input is not finite.
pub fn risk_reward(entry: f64, stop_loss: f64, take_profit: f64) -> Option<f64> {
    let risk = (entry - stop_loss).abs();
    if risk == 0.0 || !risk.is_finite() || !take_profit.is_finite() {
        return None;
    }
    Some((take_profit - entry).abs() / risk)
}
