//! Domain types for the SMC signal engine

pub mod candidate;
pub mod candle;
pub mod event;
pub mod ids;
pub mod signal;
pub mod timeframe;

pub use candidate::{levels_are_ordered, risk_reward, TradeCandidate};
pub use candle::{validate_window, Candle};
pub use event::{
    Bias, BlockState, BreakOfStructure, BreakerBlock, FairValueGap, Inducement, LiquidityPool,
    LiquiditySide, MitigationBlock, OrderBlock, PriceRange, StructuralEvent,
};
pub use ids::{CandidateId, ConfigHash};
pub use signal::{Category, ConfluenceTag, RejectionReason, Side};
pub use timeframe::Timeframe;

