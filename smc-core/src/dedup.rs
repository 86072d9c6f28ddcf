//! Duplicate/cooldown filter and the signal store it reads from.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DuplicateConfig;
use crate::domain::{Side, Timeframe, TradeCandidate};
use crate::error::SmcError;

/// Identity under which candidates are compared for duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalKey {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub side: Side,
}

impl SignalKey {
    pub fn of(candidate: &TradeCandidate) -> Self {
        Self {
            symbol: candidate.symbol.clone(),
            timeframe: candidate.timeframe,
            side: candidate.side,
        }
    }

    pub fn matches(&self, candidate: &TradeCandidate) -> bool {
        self.symbol == candidate.symbol
            && self.timeframe == candidate.timeframe
            && self.side == candidate.side
    }
}

/// Persistence for emitted candidates. Writes go through `&mut self`, so a
/// store has a single writer.
pub trait SignalStore: Send {
    /// Candidates for `key` created at or after `since`.
    fn recent(
        &self,
        key: &SignalKey,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeCandidate>, SmcError>;

    fn append(&mut self, candidate: &TradeCandidate) -> Result<(), SmcError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySignalStore {
    candidates: Vec<TradeCandidate>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn all(&self) -> &[TradeCandidate] {
        &self.candidates
    }
}

impl SignalStore for InMemorySignalStore {
    fn recent(
        &self,
        key: &SignalKey,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeCandidate>, SmcError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| key.matches(c) && c.created_at >= since)
            .cloned()
            .collect())
    }

    fn append(&mut self, candidate: &TradeCandidate) -> Result<(), SmcError> {
        self.candidates.push(candidate.clone());
        Ok(())
    }
}

/// Rejects a candidate whose entry is within `tolerance` (relative) of a
/// prior entry on the same key created within `window` before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateFilter {
    pub window: Duration,
    pub tolerance: f64,
}

impl DuplicateFilter {
    pub fn new(window: Duration, tolerance: f64) -> Self {
        Self { window, tolerance }
    }

    pub fn from_config(config: &DuplicateConfig) -> Self {
        Self::new(Duration::minutes(config.window_minutes), config.tolerance)
    }

    /// Pure check against an explicit list of prior candidates.
    pub fn is_duplicate(&self, candidate: &TradeCandidate, prior: &[TradeCandidate]) -> bool {
        let key = SignalKey::of(candidate);
        let since = candidate.created_at - self.window;
        prior.iter().any(|p| {
            key.matches(p)
                && p.created_at >= since
                && p.created_at <= candidate.created_at
                && self.entries_match(p.entry, candidate.entry)
        })
    }

    fn entries_match(&self, prior: f64, entry: f64) -> bool {
        if prior == 0.0 {
            return entry == 0.0;
        }
        ((entry - prior) / prior).abs() <= self.tolerance
    }

    /// Check against the store's recent history for the candidate's key.
    pub fn check(
        &self,
        candidate: &TradeCandidate,
        store: &dyn SignalStore,
    ) -> Result<bool, SmcError> {
        let since = candidate.created_at - self.window;
        let prior = store.recent(&SignalKey::of(candidate), since)?;
        Ok(self.is_duplicate(candidate, &prior))
    }
}
