//! Trade side, signal category, confluence tags and rejection reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::event::Bias;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The structural bias a trade on this side wants to see.
    pub fn bias(self) -> Bias {
        match self {
            Self::Buy => Bias::Bullish,
            Self::Sell => Bias::Bearish,
        }
    }

    pub fn from_bias(bias: Bias) -> Self {
        match bias {
            Bias::Bullish => Self::Buy,
            Bias::Bearish => Self::Sell,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete trade category derived from the integer confluence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Rejected,
    NoEntry,
    WeakTrade,
    ValidTrade,
    StrongTrade,
    SuperTrade,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::NoEntry => "no-entry",
            Self::WeakTrade => "weak-trade",
            Self::ValidTrade => "valid-trade",
            Self::StrongTrade => "strong-trade",
            Self::SuperTrade => "super-trade",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confluence category that can fire during aggregation.
///
/// Declaration order is the order in which tags are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceTag {
    BreakOfStructure,
    OrderBlock,
    FairValueGap,
    Liquidity,
    EqualHighsLows,
    Zone,
    HigherTimeframe,
    SmtDivergence,
    Mitigation,
    Breaker,
    Model,
    /// Recorded for explainability only; never counted toward the score.
    Killzone,
}

impl ConfluenceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BreakOfStructure => "bos",
            Self::OrderBlock => "order_block",
            Self::FairValueGap => "fvg",
            Self::Liquidity => "liquidity",
            Self::EqualHighsLows => "equal_highs_lows",
            Self::Zone => "zone",
            Self::HigherTimeframe => "htf",
            Self::SmtDivergence => "smt",
            Self::Mitigation => "mitigation",
            Self::Breaker => "breaker",
            Self::Model => "model",
            Self::Killzone => "killzone",
        }
    }

    pub fn is_counted(self) -> bool {
        !matches!(self, Self::Killzone)
    }
}

impl fmt::Display for ConfluenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a window did not produce a tradeable candidate. A normal outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    OutsideKillzone,
    NotImpulsiveMove,
    HtfConfluenceFailed,
    InsufficientConfluence,
    TpBelowMinMove,
    RiskRewardUndefined,
    InvalidTradeLevels,
    NotConfirmed,
    DuplicateSignal,
}

impl RejectionReason {
    /// Stable reason code.
    pub fn code(self) -> &'static str {
        match self {
            Self::OutsideKillzone => "outside_killzone",
            Self::NotImpulsiveMove => "not_impulsive_move",
            Self::HtfConfluenceFailed => "htf_confluence_failed",
            Self::InsufficientConfluence => "insufficient_confluence",
            Self::TpBelowMinMove => "tp_below_min_move",
            Self::RiskRewardUndefined => "risk_reward_undefined",
            Self::InvalidTradeLevels => "invalid_trade_levels",
            Self::NotConfirmed => "not_confirmed",
            Self::DuplicateSignal => "duplicate_signal",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
