//! Session (killzone) filter on the current bar's UTC time of day.

use chrono::{DateTime, Utc};

use crate::config::Session;

/// The first session containing `timestamp`, `start <= t < end`.
pub fn active_session(timestamp: DateTime<Utc>, sessions: &[Session]) -> Option<&Session> {
    let t = timestamp.time();
    sessions.iter().find(|s| s.start <= t && t < s.end)
}

pub fn in_killzone(timestamp: DateTime<Utc>, sessions: &[Session]) -> bool {
    active_session(timestamp, sessions).is_some()
}
