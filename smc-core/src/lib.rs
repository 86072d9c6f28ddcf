//! SMC Core: Smart Money Concept signal detection and confluence scoring.
//!
//! This crate turns a window of OHLCV candles into an accept/reject decision
//! with concrete trade parameters:
//! - Domain types (candles, structural events, trade candidates, ids)
//! - Indicators (ATR, SMA, EMA)
//! - Pattern detectors (order blocks, FVG, BOS, liquidity, inducement,
//!   mitigation/breaker blocks, zones, SMT, impulse, killzones, HTF trend)
//! - Confluence aggregation with strict and weighted policies
//! - Classification, trade level calculation and duplicate filtering
//! - Walk-forward backtesting over a candle history

pub mod backtest;
pub mod classifier;
pub mod config;
pub mod confirmation;
pub mod confluence;
pub mod dedup;
pub mod detectors;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod model;
pub mod pipeline;
pub mod trade_params;

pub use config::SmcConfig;
pub use error::SmcError;
pub use pipeline::{Evaluation, EvaluationInput, Outcome, SignalPipeline};
