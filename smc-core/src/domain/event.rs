//! Structural events: the observations produced by pattern detectors.
//!
//! Each event kind is its own struct carrying only its relevant fields;
//! [`StructuralEvent`] is the tagged union used when events are reported
//! together.

use serde::{Deserialize, Serialize};

/// Directional bias of a structural event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
}

impl Bias {
    pub fn flip(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Bearish => Self::Bullish,
        }
    }
}

/// Inclusive price band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub high: f64,
    pub low: f64,
}

impl PriceRange {
    pub fn new(high: f64, low: f64) -> Self {
        Self { high, low }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }

    /// True when `[low, high]` intersects this range.
    pub fn overlaps(&self, low: f64, high: f64) -> bool {
        low <= self.high && high >= self.low
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Validity of an order block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Active,
    /// A later candle closed through the far boundary at index `at`.
    Invalidated { at: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub bias: Bias,
    pub range: PriceRange,
    pub index: usize,
    pub state: BlockState,
}

impl OrderBlock {
    pub fn is_active(&self) -> bool {
        matches!(self.state, BlockState::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub bias: Bias,
    pub top: f64,
    pub bottom: f64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakOfStructure {
    pub bias: Bias,
    /// The swing level that was broken.
    pub level: f64,
    pub close: f64,
    pub index: usize,
}

/// Which side of the market the resting liquidity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquiditySide {
    /// Cluster of equal highs (buy-side liquidity).
    Highs,
    /// Cluster of equal lows (sell-side liquidity).
    Lows,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub side: LiquiditySide,
    pub level: f64,
    /// First index at which the pool was observed.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MitigationBlock {
    pub bias: Bias,
    pub range: PriceRange,
    pub index: usize,
    pub bos_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerBlock {
    /// Polarity after the flip.
    pub bias: Bias,
    pub range: PriceRange,
    /// Index of the candle that invalidated the original block.
    pub index: usize,
    /// Index of the original order block.
    pub origin_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inducement {
    pub side: LiquiditySide,
    /// The equal level that was swept.
    pub level: f64,
    pub index: usize,
}

/// Tagged union over every structural observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralEvent {
    OrderBlock(OrderBlock),
    FairValueGap(FairValueGap),
    BreakOfStructure(BreakOfStructure),
    LiquidityPool(LiquidityPool),
    MitigationBlock(MitigationBlock),
    BreakerBlock(BreakerBlock),
    Inducement(Inducement),
}

impl StructuralEvent {
    pub fn index(&self) -> usize {
        match self {
            Self::OrderBlock(e) => e.index,
            Self::FairValueGap(e) => e.index,
            Self::BreakOfStructure(e) => e.index,
            Self::LiquidityPool(e) => e.index,
            Self::MitigationBlock(e) => e.index,
            Self::BreakerBlock(e) => e.index,
            Self::Inducement(e) => e.index,
        }
    }

    /// Bias of the event. Liquidity pools and inducements are side-tagged
    /// rather than biased and return `None`.
    pub fn bias(&self) -> Option<Bias> {
        match self {
            Self::OrderBlock(e) => Some(e.bias),
            Self::FairValueGap(e) => Some(e.bias),
            Self::BreakOfStructure(e) => Some(e.bias),
            Self::MitigationBlock(e) => Some(e.bias),
            Self::BreakerBlock(e) => Some(e.bias),
            Self::LiquidityPool(_) | Self::Inducement(_) => None,
        }
    }

    /// Price band covered by the event.
    pub fn range(&self) -> PriceRange {
        match self {
            Self::OrderBlock(e) => e.range,
            Self::FairValueGap(e) => PriceRange::new(e.top, e.bottom),
            Self::BreakOfStructure(e) => {
                PriceRange::new(e.level.max(e.close), e.level.min(e.close))
            }
            Self::LiquidityPool(e) => PriceRange::new(e.level, e.level),
            Self::MitigationBlock(e) => e.range,
            Self::BreakerBlock(e) => e.range,
            Self::Inducement(e) => PriceRange::new(e.level, e.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_flip() {
        assert_eq!(Bias::Bullish.flip(), Bias::Bearish);
        assert_eq!(Bias::Bearish.flip(), Bias::Bullish);
    }

    #[test]
    fn price_range_contains_is_inclusive() {
        let range = PriceRange::new(110.0, 100.0);
        assert!(range.contains(100.0));
        assert!(range.contains(110.0));
        assert!(!range.contains(110.01));
        assert_eq!(range.midpoint(), 105.0);
        assert_eq!(range.width(), 10.0);
    }

    #[test]
    fn price_range_overlap() {
        let range = PriceRange::new(110.0, 100.0);
        assert!(range.overlaps(95.0, 100.0));
        assert!(range.overlaps(104.0, 106.0));
        assert!(!range.overlaps(111.0, 115.0));
    }

    #[test]
    fn event_accessors() {
        let fvg = StructuralEvent::FairValueGap(FairValueGap {
            bias: Bias::Bullish,
            top: 12.0,
            bottom: 10.0,
            index: 4,
        });
        assert_eq!(fvg.index(), 4);
        assert_eq!(fvg.bias(), Some(Bias::Bullish));
        assert_eq!(fvg.range(), PriceRange::new(12.0, 10.0));

        let pool = StructuralEvent::LiquidityPool(LiquidityPool {
            side: LiquiditySide::Highs,
            level: 50.0,
            index: 9,
        });
        assert_eq!(pool.bias(), None);
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let bos = StructuralEvent::BreakOfStructure(BreakOfStructure {
            bias: Bias::Bearish,
            level: 99.0,
            close: 98.5,
            index: 20,
        });
        let json = serde_json::to_value(bos).unwrap();
        assert_eq!(json["kind"], "break_of_structure");
        assert_eq!(json["bias"], "bearish");
    }
}
