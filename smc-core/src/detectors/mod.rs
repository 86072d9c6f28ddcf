//! Pattern detectors: pure functions from a candle window to structural
//! observations.
//!
//! A window shorter than a detector needs yields an empty result (`Vec`,
//! `None` or `false`), never an error. No detector reads beyond the last
//! candle it is given.

pub mod blocks;
pub mod fvg;
pub mod htf;
pub mod impulse;
pub mod inducement;
pub mod killzone;
pub mod liquidity;
pub mod order_block;
pub mod smt;
pub mod structure;
pub mod zone;

pub use blocks::{detect_breakers, detect_mitigations};
pub use fvg::{detect_fvgs, has_recent_gap};
pub use htf::{htf_confirms, htf_readings, resample, trend_label, HtfReading, TrendLabel};
pub use impulse::is_impulsive_move;
pub use inducement::{detect_inducements, has_recent_sweep};
pub use killzone::{active_session, in_killzone};
pub use liquidity::{detect_liquidity_pools, has_target_liquidity};
pub use order_block::{
    active_block_containing, body_impulse_blocks, detect_order_blocks, resolve_state,
    three_candle_blocks,
};
pub use smt::{detect_smt, SmtDivergence};
pub use structure::detect_bos;
pub use zone::{premium_discount, Zone, ZoneReading};
