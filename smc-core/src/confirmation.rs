//! Final confirmation step before a candidate is emitted.
//!
//! The pipeline consults its policy only when `require_confirmation` is set.
//! The default policy rejects everything, so enabling confirmation without
//! choosing a policy never lets a signal through.

use crate::confluence::MarketStructure;
use crate::domain::{Candle, Side};
use crate::indicators::sma_of_series;

pub trait ConfirmationPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn confirm(&self, candles: &[Candle], side: Side, structure: &MarketStructure) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReject;

impl ConfirmationPolicy for AlwaysReject {
    fn name(&self) -> &str {
        "always_reject"
    }

    fn confirm(&self, _: &[Candle], _: Side, _: &MarketStructure) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationPolicy for AlwaysConfirm {
    fn name(&self) -> &str {
        "always_confirm"
    }

    fn confirm(&self, _: &[Candle], _: Side, _: &MarketStructure) -> bool {
        true
    }
}

/// Longs need the close below equilibrium (discount) and above the
/// moving average; shorts the mirror image.
#[derive(Debug, Clone)]
pub struct SmcConfirmation {
    pub sma_period: usize,
}

impl SmcConfirmation {
    pub fn new(sma_period: usize) -> Self {
        assert!(sma_period >= 1, "sma_period must be >= 1");
        Self { sma_period }
    }

    pub fn default_params() -> Self {
        Self::new(20)
    }
}

impl ConfirmationPolicy for SmcConfirmation {
    fn name(&self) -> &str {
        "smc_confirmation"
    }

    fn confirm(&self, candles: &[Candle], side: Side, structure: &MarketStructure) -> bool {
        let (Some(last), Some(equilibrium)) = (candles.last(), structure.equilibrium()) else {
            return false;
        };
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let sma = match sma_of_series(&closes, self.sma_period).last() {
            Some(&v) if v.is_finite() => v,
            _ => return false,
        };
        match side {
            Side::Buy => last.close < equilibrium && last.close > sma,
            Side::Sell => last.close > equilibrium && last.close < sma,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmcConfig;
    use crate::indicators::make_candles;

    fn structure_for(candles: &[Candle]) -> MarketStructure {
        MarketStructure::scan(candles, None, &SmcConfig::default())
    }

    #[test]
    fn trivial_policies() {
        let candles = make_candles(&[100.0; 5]);
        let s = structure_for(&candles);
        assert!(!AlwaysReject.confirm(&candles, Side::Buy, &s));
        assert!(AlwaysConfirm.confirm(&candles, Side::Sell, &s));
    }

    #[test]
    fn long_confirmed_in_discount_above_sma() {
        // Sharp drop, a base, then a small bounce: close under the swing
        // midpoint but back above the 20-bar average.
        let mut closes = vec![120.0; 10];
        closes.extend([110.0, 100.0]);
        closes.extend([100.0; 20]);
        closes.push(101.0);
        let candles = make_candles(&closes);
        let s = structure_for(&candles);
        // Swing 121..99, so equilibrium is 110; SMA-20 is 100.05.
        assert_eq!(s.equilibrium(), Some(110.0));
        assert!(SmcConfirmation::default_params().confirm(&candles, Side::Buy, &s));
        assert!(!SmcConfirmation::default_params().confirm(&candles, Side::Sell, &s));
    }

    #[test]
    fn too_short_for_average_is_not_confirmed() {
        let candles = make_candles(&[100.0, 99.0, 101.0]);
        let s = structure_for(&candles);
        assert!(!SmcConfirmation::default_params().confirm(&candles, Side::Buy, &s));
    }
}
