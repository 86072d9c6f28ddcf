//! Candle loading from CSV.
//!
//! Expected header: `timestamp,open,high,low,close,volume`, where
//! `timestamp` is either epoch milliseconds or an RFC 3339 string. Rows are
//! returned in file order; ordering and sanity are checked by the core
//! before evaluation.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use smc_core::domain::Candle;

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| anyhow!("timestamp out of range: {ms}"));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("unrecognized timestamp '{raw}'"))
}

pub fn read_candles<R: std::io::Read>(reader: R) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<CandleRow>()
        .enumerate()
        .map(|(i, row)| {
            // Header is line 1.
            let line = i + 2;
            let row = row.with_context(|| format!("bad candle row at line {line}"))?;
            Ok(Candle {
                timestamp: parse_timestamp(&row.timestamp)
                    .with_context(|| format!("line {line}"))?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            })
        })
        .collect()
}

pub fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open candle file: {}", path.display()))?;
    read_candles(file).with_context(|| format!("failed to read candles from {}", path.display()))
}
