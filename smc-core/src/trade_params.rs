//! Stop-loss and take-profit placement.
//!
//! With a matching order block the stop sits beyond its far boundary by a
//! fraction of ATR; otherwise it is placed at `max(atr * mult, entry * floor)`
//! from entry. Targets are multiples of the resulting risk.

use serde::{Deserialize, Serialize};

use crate::config::TradeConfig;
use crate::domain::{levels_are_ordered, risk_reward, OrderBlock, RejectionReason, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub take_profits: Vec<f64>,
    pub risk_reward: f64,
}

/// Stop-loss for `side` at `entry`.
pub fn stop_loss(
    side: Side,
    entry: f64,
    block: Option<&OrderBlock>,
    atr: f64,
    trade: &TradeConfig,
) -> f64 {
    match (side, block) {
        (Side::Buy, Some(b)) => b.range.low - atr * trade.ob_buffer_atr,
        (Side::Sell, Some(b)) => b.range.high + atr * trade.ob_buffer_atr,
        (Side::Buy, None) => entry - fallback_distance(entry, atr, trade),
        (Side::Sell, None) => entry + fallback_distance(entry, atr, trade),
    }
}

fn fallback_distance(entry: f64, atr: f64, trade: &TradeConfig) -> f64 {
    (atr * trade.atr_stop_mult).max(entry * trade.min_stop_fraction)
}

/// Target at `multiple` times the risk from entry.
pub fn target_at(side: Side, entry: f64, stop_loss: f64, multiple: f64) -> f64 {
    let distance = (entry - stop_loss).abs() * multiple;
    match side {
        Side::Buy => entry + distance,
        Side::Sell => entry - distance,
    }
}

/// Full level computation with every rejection the calculator owns.
pub fn compute_levels(
    side: Side,
    entry: f64,
    block: Option<&OrderBlock>,
    atr: f64,
    trade: &TradeConfig,
    price_increment: f64,
) -> Result<TradeLevels, RejectionReason> {
    let stop_loss = stop_loss(side, entry, block, atr, trade);
    if stop_loss == entry {
        return Err(RejectionReason::RiskRewardUndefined);
    }
    let take_profit = target_at(side, entry, stop_loss, trade.target_rr);
    let take_profits: Vec<f64> = trade
        .take_profit_ladder
        .iter()
        .map(|&m| target_at(side, entry, stop_loss, m))
        .collect();

    let all_finite = [entry, stop_loss, take_profit]
        .iter()
        .chain(take_profits.iter())
        .all(|v| v.is_finite());
    if !all_finite || !levels_are_ordered(side, entry, stop_loss, take_profit) {
        return Err(RejectionReason::InvalidTradeLevels);
    }
    let risk_reward =
        risk_reward(entry, stop_loss, take_profit).ok_or(RejectionReason::RiskRewardUndefined)?;

    if (take_profit - entry).abs() / price_increment < trade.min_move_units {
        return Err(RejectionReason::TpBelowMinMove);
    }

    Ok(TradeLevels {
        entry,
        stop_loss,
        take_profit,
        take_profits,
        risk_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bias, BlockState, PriceRange};
    use crate::indicators::assert_approx;

    fn loose() -> TradeConfig {
        TradeConfig {
            min_move_units: 0.0,
            ..TradeConfig::default()
        }
    }

    fn block(bias: Bias, high: f64, low: f64) -> OrderBlock {
        OrderBlock {
            bias,
            range: PriceRange::new(high, low),
            index: 0,
            state: BlockState::Active,
        }
    }

    #[test]
    fn take_profit_from_risk_reward() {
        assert_eq!(target_at(Side::Buy, 100.0, 98.0, 2.0), 104.0);
        assert_eq!(target_at(Side::Sell, 100.0, 102.0, 2.0), 96.0);
    }

    #[test]
    fn stop_beyond_order_block_with_atr_buffer() {
        let trade = TradeConfig::default();
        let bull = block(Bias::Bullish, 100.0, 98.0);
        assert_approx(stop_loss(Side::Buy, 100.5, Some(&bull), 2.0, &trade), 97.8, 1e-12);
        let bear = block(Bias::Bearish, 102.0, 100.0);
        assert_approx(stop_loss(Side::Sell, 99.5, Some(&bear), 2.0, &trade), 102.2, 1e-12);
    }

    #[test]
    fn fallback_stop_uses_larger_of_atr_and_floor() {
        let trade = TradeConfig::default();
        // ATR dominates.
        assert_eq!(stop_loss(Side::Buy, 100.0, None, 2.0, &trade), 98.0);
        // Floor dominates: 50000 * 0.0005 = 25 > 10.
        assert_eq!(stop_loss(Side::Sell, 50_000.0, None, 10.0, &trade), 50_025.0);
    }

    #[test]
    fn levels_with_ladder() {
        let levels = compute_levels(Side::Buy, 100.0, None, 2.0, &loose(), 0.01).unwrap();
        assert_eq!(levels.stop_loss, 98.0);
        assert_eq!(levels.take_profit, 104.0);
        assert_eq!(levels.take_profits, vec![102.0, 104.0, 106.0]);
        assert_approx(levels.risk_reward, 2.0, 1e-12);
    }

    #[test]
    fn small_target_is_rejected_regardless_of_structure() {
        // Risk 50 from ATR, target 100 points at increment 1.0.
        let result = compute_levels(Side::Buy, 50_000.0, None, 50.0, &TradeConfig::default(), 1.0);
        assert_eq!(result, Err(RejectionReason::TpBelowMinMove));
    }

    #[test]
    fn zero_risk_is_undefined() {
        let trade = TradeConfig {
            atr_stop_mult: 1.0,
            min_stop_fraction: 0.0,
            ..loose()
        };
        let result = compute_levels(Side::Buy, 100.0, None, 0.0, &trade, 0.01);
        assert_eq!(result, Err(RejectionReason::RiskRewardUndefined));
    }

    #[test]
    fn block_on_wrong_side_is_invalid() {
        // A block above entry would put a long stop above price.
        let above = block(Bias::Bullish, 105.0, 103.0);
        let result = compute_levels(Side::Buy, 100.0, Some(&above), 1.0, &loose(), 0.01);
        assert_eq!(result, Err(RejectionReason::InvalidTradeLevels));
    }

    #[test]
    fn non_finite_atr_is_invalid() {
        let result = compute_levels(Side::Sell, 100.0, None, f64::NAN, &loose(), 0.01);
        // NaN.max(floor) is the floor, so the stop is still finite.
        assert!(result.is_ok());
        let bear = block(Bias::Bearish, 101.0, 100.5);
        let result = compute_levels(Side::Sell, 100.0, Some(&bear), f64::INFINITY, &loose(), 0.01);
        assert_eq!(result, Err(RejectionReason::InvalidTradeLevels));
    }
}
