//! Premium/discount zoning around the swing equilibrium.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Candle, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Premium,
    Discount,
    FairValue,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Discount => "discount",
            Self::FairValue => "fair_value",
        }
    }

    /// Longs are favoured from discount, shorts from premium.
    pub fn favours(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Discount, Side::Buy) | (Self::Premium, Side::Sell)
        )
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneReading {
    pub zone: Zone,
    pub equilibrium: f64,
}

/// Classify the latest close against the midpoint of the swing range over
/// the last `lookback` candles (the whole window if shorter).
///
/// `band` is a fraction of equilibrium; a close within it reads as
/// `FairValue`. A band of 0 disables that reading.
pub fn premium_discount(candles: &[Candle], lookback: usize, band: f64) -> Option<ZoneReading> {
    let last = candles.last()?;
    let window = &candles[candles.len().saturating_sub(lookback.max(1))..];

    let swing_high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let swing_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let equilibrium = (swing_high + swing_low) / 2.0;

    let zone = if band > 0.0 && (last.close - equilibrium).abs() <= equilibrium * band {
        Zone::FairValue
    } else if last.close > equilibrium {
        Zone::Premium
    } else {
        Zone::Discount
    };
    Some(ZoneReading { zone, equilibrium })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc, DEFAULT_EPSILON};

    fn swing(last_close: f64) -> Vec<Candle> {
        make_ohlc(&[
            (100.0, 110.0, 99.0, 105.0),
            (105.0, 106.0, 90.0, 95.0),
            (95.0, 101.0, 94.0, last_close),
        ])
    }

    #[test]
    fn close_above_equilibrium_is_premium() {
        let reading = premium_discount(&swing(100.5), 50, 0.0).unwrap();
        assert_approx(reading.equilibrium, 100.0, DEFAULT_EPSILON);
        assert_eq!(reading.zone, Zone::Premium);
    }

    #[test]
    fn close_at_or_below_equilibrium_is_discount() {
        assert_eq!(premium_discount(&swing(100.0), 50, 0.0).unwrap().zone, Zone::Discount);
        assert_eq!(premium_discount(&swing(96.0), 50, 0.0).unwrap().zone, Zone::Discount);
    }

    #[test]
    fn band_reports_fair_value() {
        let reading = premium_discount(&swing(100.5), 50, 0.01).unwrap();
        assert_eq!(reading.zone, Zone::FairValue);
    }

    #[test]
    fn lookback_limits_swing() {
        // Only the last candle: eq = (101 + 94) / 2 = 97.5
        let reading = premium_discount(&swing(100.5), 1, 0.0).unwrap();
        assert_approx(reading.equilibrium, 97.5, DEFAULT_EPSILON);
        assert_eq!(reading.zone, Zone::Premium);
    }

    #[test]
    fn empty_window_has_no_zone() {
        assert!(premium_discount(&[], 50, 0.0).is_none());
    }

    #[test]
    fn zone_side_preference() {
        assert!(Zone::Discount.favours(Side::Buy));
        assert!(Zone::Premium.favours(Side::Sell));
        assert!(!Zone::Premium.favours(Side::Buy));
        assert!(!Zone::FairValue.favours(Side::Sell));
    }
}
