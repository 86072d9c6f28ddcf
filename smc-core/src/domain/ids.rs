use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::signal::Side;
use super::timeframe::Timeframe;

/// Deterministic configuration hash (BLAKE3 of the canonical JSON config).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-addressed candidate ID.
///
/// Identical inputs (symbol, timeframe, side, entry, creation time) always
/// produce the same ID, so re-evaluating the same window cannot mint a new
/// identity for the same setup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn derive(
        symbol: &str,
        timeframe: Timeframe,
        side: Side,
        entry: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let canonical = serde_json::json!({
            "symbol": symbol,
            "timeframe": timeframe.as_str(),
            "side": side.as_str(),
            "entry_bits": entry.to_bits(),
            "created_at": created_at.timestamp_millis(),
        });
        let hash = blake3::hash(canonical.to_string().as_bytes());
        Self(hash.to_hex()[..16].to_string())
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, minute, 0).unwrap()
    }

    #[test]
    fn candidate_id_deterministic() {
        let a = CandidateId::derive("BTCUSDT", Timeframe::M5, Side::Buy, 50_000.0, at(0));
        let b = CandidateId::derive("BTCUSDT", Timeframe::M5, Side::Buy, 50_000.0, at(0));
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 16);
    }

    #[test]
    fn candidate_id_changes_with_inputs() {
        let a = CandidateId::derive("BTCUSDT", Timeframe::M5, Side::Buy, 50_000.0, at(0));
        let b = CandidateId::derive("BTCUSDT", Timeframe::M5, Side::Sell, 50_000.0, at(0));
        let c = CandidateId::derive("BTCUSDT", Timeframe::M5, Side::Buy, 50_000.0, at(5));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn config_hash_is_hex() {
        let h = ConfigHash::from_bytes(b"{}");
        assert_eq!(h.0.len(), 64);
        assert!(h.0.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
