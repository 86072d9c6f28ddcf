//! Higher-timeframe confirmation.
//!
//! The base window is resampled into each configured timeframe and a
//! fast/slow moving-average trend label is read off every series. The base
//! bias is confirmed only when every label agrees with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{HtfConfig, MaKind};
use crate::domain::{Bias, Candle, Timeframe};
use crate::indicators::{ema_of_series, sma_of_series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Bull,
    Bear,
    Neutral,
}

impl TrendLabel {
    pub fn agrees_with(self, bias: Bias) -> bool {
        matches!(
            (self, bias),
            (Self::Bull, Bias::Bullish) | (Self::Bear, Bias::Bearish)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtfReading {
    pub timeframe: Timeframe,
    pub label: TrendLabel,
}

/// Aggregate candles into `timeframe` buckets aligned to the UNIX epoch.
///
/// Open is the first open, close the last close, high/low the extremes and
/// volume the sum. Buckets without candles do not appear.
pub fn resample(candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
    let bucket_secs = timeframe.minutes() * 60;
    let mut out: Vec<Candle> = Vec::new();
    let mut current_bucket: Option<i64> = None;

    for c in candles {
        let bucket = c.timestamp.timestamp().div_euclid(bucket_secs);
        match (current_bucket, out.last_mut()) {
            (Some(b), Some(agg)) if b == bucket => {
                agg.high = agg.high.max(c.high);
                agg.low = agg.low.min(c.low);
                agg.close = c.close;
                agg.volume += c.volume;
            }
            _ => {
                let start = DateTime::<Utc>::from_timestamp(bucket * bucket_secs, 0)
                    .unwrap_or(c.timestamp);
                out.push(Candle {
                    timestamp: start,
                    ..*c
                });
                current_bucket = Some(bucket);
            }
        }
    }
    out
}

/// Trend label from the last fast and slow moving-average values.
/// Fewer than `slow` candles read as `Neutral`.
pub fn trend_label(candles: &[Candle], ma: MaKind, fast: usize, slow: usize) -> TrendLabel {
    if candles.len() < slow || fast == 0 {
        return TrendLabel::Neutral;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let series = |period| match ma {
        MaKind::Sma => sma_of_series(&closes, period),
        MaKind::Ema => ema_of_series(&closes, period),
    };
    let (f, s) = match (series(fast).last(), series(slow).last()) {
        (Some(&f), Some(&s)) if f.is_finite() && s.is_finite() => (f, s),
        _ => return TrendLabel::Neutral,
    };

    if f > s {
        TrendLabel::Bull
    } else if f < s {
        TrendLabel::Bear
    } else {
        TrendLabel::Neutral
    }
}

/// Label every configured timeframe.
pub fn htf_readings(candles: &[Candle], config: &HtfConfig) -> Vec<HtfReading> {
    config
        .timeframes
        .iter()
        .map(|&timeframe| {
            let series = resample(candles, timeframe);
            HtfReading {
                timeframe,
                label: trend_label(&series, config.ma, config.fast_period, config.slow_period),
            }
        })
        .collect()
}

/// True when at least one timeframe is configured and all of them agree.
pub fn htf_confirms(readings: &[HtfReading], bias: Bias) -> bool {
    !readings.is_empty() && readings.iter().all(|r| r.label.agrees_with(bias))
}
