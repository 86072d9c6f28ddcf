//! SMT divergence between a primary instrument and a correlated reference.

use serde::{Deserialize, Serialize};

use crate::domain::{Bias, Candle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtDivergence {
    /// Primary swept to a new low, reference held.
    BullDiv,
    /// Primary swept to a new high, reference held.
    BearDiv,
}

impl SmtDivergence {
    pub fn bias(self) -> Bias {
        match self {
            Self::BullDiv => Bias::Bullish,
            Self::BearDiv => Bias::Bearish,
        }
    }
}

/// Compare the latest candle of each series with the `lookback - 1`
/// candles before it. Both series need at least `lookback` candles.
pub fn detect_smt(
    primary: &[Candle],
    reference: &[Candle],
    lookback: usize,
) -> Option<SmtDivergence> {
    if lookback < 2 || primary.len() < lookback || reference.len() < lookback {
        return None;
    }
    let p = Extremes::of(primary, lookback);
    let r = Extremes::of(reference, lookback);

    if p.last_low < p.prior_low && r.last_low >= r.prior_low {
        Some(SmtDivergence::BullDiv)
    } else if p.last_high > p.prior_high && r.last_high <= r.prior_high {
        Some(SmtDivergence::BearDiv)
    } else {
        None
    }
}

struct Extremes {
    last_low: f64,
    last_high: f64,
    prior_low: f64,
    prior_high: f64,
}

impl Extremes {
    fn of(candles: &[Candle], lookback: usize) -> Self {
        let n = candles.len();
        let prior = &candles[n - lookback..n - 1];
        let last = &candles[n - 1];
        Self {
            last_low: last.low,
            last_high: last.high,
            prior_low: prior.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
            prior_high: prior.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
