//! Serializable engine configuration.
//!
//! Every threshold, lookback and weight used by the detectors, the
//! aggregator, the calculator and the duplicate filter lives here. Every
//! section defaults to the documented values, so a TOML file only needs to
//! name what it overrides.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{ConfigHash, ConfluenceTag, Timeframe};
use crate::error::SmcError;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmcConfig {
    pub instrument: InstrumentConfig,
    pub detectors: DetectorConfig,
    pub killzones: KillzoneConfig,
    pub htf: HtfConfig,
    pub scoring: ScoringConfig,
    pub trade: TradeConfig,
    pub duplicate: DuplicateConfig,
    pub model: ModelConfig,
    /// Consult the pipeline's confirmation policy before accepting.
    pub require_confirmation: bool,
}

impl Default for SmcConfig {
    fn default() -> Self {
        Self {
            instrument: InstrumentConfig::default(),
            detectors: DetectorConfig::default(),
            killzones: KillzoneConfig::default(),
            htf: HtfConfig::default(),
            scoring: ScoringConfig::default(),
            trade: TradeConfig::default(),
            duplicate: DuplicateConfig::default(),
            model: ModelConfig::default(),
            require_confirmation: false,
        }
    }
}

impl SmcConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SmcError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SmcError> {
        let config: Self =
            toml::from_str(content).map_err(|e| SmcError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, SmcError> {
        toml::to_string_pretty(self).map_err(|e| SmcError::ConfigParse(e.to_string()))
    }

    /// Deterministic identity of this configuration.
    pub fn config_hash(&self) -> ConfigHash {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        let json = serde_json::to_string(self).unwrap_or_default();
        ConfigHash::from_bytes(json.as_bytes())
    }

    pub fn validate(&self) -> Result<(), SmcError> {
        let invalid = |msg: String| Err(SmcError::InvalidConfig(msg));

        if !(self.instrument.price_increment > 0.0) {
            return invalid(format!(
                "instrument.price_increment must be > 0 (got {})",
                self.instrument.price_increment
            ));
        }

        let d = &self.detectors;
        for (name, value) in [
            ("detectors.order_block_lookback", d.order_block_lookback),
            ("detectors.bos_lookback", d.bos_lookback),
            ("detectors.fvg_recent", d.fvg_recent),
            ("detectors.liquidity_lookback", d.liquidity_lookback),
            ("detectors.inducement_recent", d.inducement_recent),
            ("detectors.mitigation_recent", d.mitigation_recent),
            ("detectors.zone_lookback", d.zone_lookback),
            ("trade.atr_period", self.trade.atr_period),
            ("htf.fast_period", self.htf.fast_period),
        ] {
            if value == 0 {
                return invalid(format!("{name} must be >= 1"));
            }
        }
        if d.smt_lookback < 2 {
            return invalid("detectors.smt_lookback must be >= 2".into());
        }
        if self.htf.slow_period <= self.htf.fast_period {
            return invalid(format!(
                "htf.slow_period ({}) must exceed htf.fast_period ({})",
                self.htf.slow_period, self.htf.fast_period
            ));
        }

        for session in &self.killzones.sessions {
            if session.start >= session.end {
                return invalid(format!(
                    "killzone '{}' must start before it ends",
                    session.name
                ));
            }
        }

        let weights = self.scoring.weights.all();
        if let Some((tag, w)) = weights.iter().find(|(_, w)| *w < 0.0 || !w.is_finite()) {
            return invalid(format!("weight for {tag} must be >= 0 (got {w})"));
        }
        let total = self.scoring.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return invalid(format!("confluence weights must sum to 1.0 (got {total:.6})"));
        }
        if self.scoring.actionable_threshold > 5 {
            return invalid("scoring.actionable_threshold must be within 0..=5".into());
        }
        if !(0.0..=1.0).contains(&self.scoring.off_session_factor) {
            return invalid("scoring.off_session_factor must be within 0..=1".into());
        }

        let t = &self.trade;
        if !(t.target_rr > 0.0) {
            return invalid(format!("trade.target_rr must be > 0 (got {})", t.target_rr));
        }
        if t.take_profit_ladder.iter().any(|r| !(*r > 0.0)) {
            return invalid("trade.take_profit_ladder multiples must be > 0".into());
        }
        if t.ob_buffer_atr < 0.0 || t.atr_stop_mult < 0.0 || t.min_stop_fraction < 0.0 {
            return invalid("trade stop buffers must be >= 0".into());
        }
        if t.atr_stop_mult == 0.0 && t.min_stop_fraction == 0.0 {
            return invalid(
                "trade.atr_stop_mult and trade.min_stop_fraction cannot both be 0".into(),
            );
        }

        if self.duplicate.tolerance < 0.0 || self.duplicate.window_minutes < 0 {
            return invalid("duplicate tolerance and window must be >= 0".into());
        }
        if !(0.0..=1.0).contains(&self.model.min_probability) {
            return invalid("model.min_probability must be within 0..=1".into());
        }

        Ok(())
    }
}

/// Instrument-level units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Size of one price increment ("point"/"pip") in quote currency.
    pub price_increment: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            price_increment: 1.0,
        }
    }
}

/// How order blocks are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBlockMethod {
    /// Last opposing candle before a two-candle impulse.
    ThreeCandle,
    /// Large-bodied candle relative to its range and price.
    BodyImpulse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub order_block_method: OrderBlockMethod,
    pub order_block_lookback: usize,
    pub ob_min_body_ratio: f64,
    pub ob_min_body_fraction: f64,
    pub bos_lookback: usize,
    /// An FVG only counts if it formed within this many candles of the end.
    pub fvg_recent: usize,
    pub liquidity_lookback: usize,
    /// Max spread of a cluster, as a fraction of close.
    pub liquidity_tolerance: f64,
    /// Decimal places used to deduplicate pool levels.
    pub liquidity_precision: u32,
    /// Equal-level tolerance in price increments.
    pub equal_level_tolerance_units: f64,
    pub inducement_recent: usize,
    pub mitigation_recent: usize,
    pub zone_lookback: usize,
    /// Fraction of equilibrium reported as fair value. 0 disables the band.
    pub equilibrium_band: f64,
    pub smt_lookback: usize,
    pub require_impulsive_move: bool,
    /// Minimum prior-candle range in price increments.
    pub min_impulse_units: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            order_block_method: OrderBlockMethod::ThreeCandle,
            order_block_lookback: 200,
            ob_min_body_ratio: 0.6,
            ob_min_body_fraction: 0.0015,
            bos_lookback: 20,
            fvg_recent: 50,
            liquidity_lookback: 20,
            liquidity_tolerance: 0.0005,
            liquidity_precision: 5,
            equal_level_tolerance_units: 10.0,
            inducement_recent: 10,
            mitigation_recent: 5,
            zone_lookback: 50,
            equilibrium_band: 0.0,
            smt_lookback: 20,
            require_impulsive_move: true,
            min_impulse_units: 150.0,
        }
    }
}

/// A trading session window in UTC, `start <= t < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Session {
    pub fn new(name: &str, start_hour: u32, end_hour: u32) -> Self {
        Self {
            name: name.to_string(),
            start: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillzoneConfig {
    pub sessions: Vec<Session>,
}

impl Default for KillzoneConfig {
    fn default() -> Self {
        Self {
            sessions: vec![Session::new("london", 7, 11), Session::new("new_york", 12, 16)],
        }
    }
}

/// Moving-average flavour for the higher-timeframe trend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    Sma,
    Ema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtfConfig {
    pub enabled: bool,
    pub timeframes: Vec<Timeframe>,
    pub ma: MaKind,
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for HtfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeframes: vec![Timeframe::M15, Timeframe::H1],
            ma: MaKind::Sma,
            fast_period: 5,
            slow_period: 10,
        }
    }
}

/// Aggregation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Ordered hard gates; the first failure short-circuits.
    Strict,
    /// Weighted tally; every category is recorded, gates never short-circuit.
    Weighted,
}

/// Per-category confluence weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceWeights {
    pub bos: f64,
    pub order_block: f64,
    pub fvg: f64,
    pub liquidity: f64,
    pub zone: f64,
    pub equal_highs_lows: f64,
    pub htf: f64,
    pub smt: f64,
    pub mitigation: f64,
    pub breaker: f64,
    pub model: f64,
}

impl Default for ConfluenceWeights {
    fn default() -> Self {
        Self {
            bos: 0.30,
            order_block: 0.25,
            fvg: 0.12,
            liquidity: 0.10,
            zone: 0.10,
            equal_highs_lows: 0.08,
            htf: 0.05,
            smt: 0.0,
            mitigation: 0.0,
            breaker: 0.0,
            model: 0.0,
        }
    }
}

impl ConfluenceWeights {
    pub fn weight(&self, tag: ConfluenceTag) -> f64 {
        match tag {
            ConfluenceTag::BreakOfStructure => self.bos,
            ConfluenceTag::OrderBlock => self.order_block,
            ConfluenceTag::FairValueGap => self.fvg,
            ConfluenceTag::Liquidity => self.liquidity,
            ConfluenceTag::Zone => self.zone,
            ConfluenceTag::EqualHighsLows => self.equal_highs_lows,
            ConfluenceTag::HigherTimeframe => self.htf,
            ConfluenceTag::SmtDivergence => self.smt,
            ConfluenceTag::Mitigation => self.mitigation,
            ConfluenceTag::Breaker => self.breaker,
            ConfluenceTag::Model => self.model,
            ConfluenceTag::Killzone => 0.0,
        }
    }

    pub fn all(&self) -> [(ConfluenceTag, f64); 11] {
        [
            (ConfluenceTag::BreakOfStructure, self.bos),
            (ConfluenceTag::OrderBlock, self.order_block),
            (ConfluenceTag::FairValueGap, self.fvg),
            (ConfluenceTag::Liquidity, self.liquidity),
            (ConfluenceTag::Zone, self.zone),
            (ConfluenceTag::EqualHighsLows, self.equal_highs_lows),
            (ConfluenceTag::HigherTimeframe, self.htf),
            (ConfluenceTag::SmtDivergence, self.smt),
            (ConfluenceTag::Mitigation, self.mitigation),
            (ConfluenceTag::Breaker, self.breaker),
            (ConfluenceTag::Model, self.model),
        ]
    }

    pub fn total(&self) -> f64 {
        self.all().iter().map(|(_, w)| w).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub mode: PolicyMode,
    pub weights: ConfluenceWeights,
    /// Minimum integer score for an actionable category.
    pub actionable_threshold: u8,
    pub max_weighted_score: f64,
    /// Weighted-score multiplier applied outside every killzone (weighted mode).
    pub off_session_factor: f64,
    /// Integer-score deduction applied outside every killzone (weighted mode).
    pub off_session_penalty: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Weighted,
            weights: ConfluenceWeights::default(),
            actionable_threshold: 3,
            max_weighted_score: 0.99,
            off_session_factor: 0.5,
            off_session_penalty: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    pub target_rr: f64,
    /// Extra targets as R multiples.
    pub take_profit_ladder: Vec<f64>,
    pub atr_period: usize,
    /// Stop buffer beyond an order block, as a fraction of ATR.
    pub ob_buffer_atr: f64,
    /// Fallback stop distance as a multiple of ATR.
    pub atr_stop_mult: f64,
    /// Fallback stop floor as a fraction of entry.
    pub min_stop_fraction: f64,
    /// Minimum entry-to-target distance in price increments.
    pub min_move_units: f64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            target_rr: 2.0,
            take_profit_ladder: vec![1.0, 2.0, 3.0],
            atr_period: 14,
            ob_buffer_atr: 0.1,
            atr_stop_mult: 1.0,
            min_stop_fraction: 0.0005,
            min_move_units: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    pub window_minutes: i64,
    /// Relative entry tolerance (0.0005 = 0.05%).
    pub tolerance: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            window_minutes: 30,
            tolerance: 0.0005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// A model prediction below this probability never fires the model tag.
    pub min_probability: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.55,
        }
    }
}
