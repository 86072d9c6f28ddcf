//! Optional machine-learning collaborator.
//!
//! The engine never owns a model. Callers pass an `Option<&dyn SignalModel>`
//! into each evaluation; a prediction agreeing with the structural bias at
//! sufficient probability fires the `Model` confluence.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, OrderBlock, Side, Timeframe};

/// Numeric feature vector describing one evaluation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Body return of the last candle.
    pub ret_1: f64,
    pub ret_3: f64,
    pub ret_5: f64,
    pub ret_10: f64,
    /// Mean high-low range of the last 14 candles.
    pub mean_range_14: f64,
    /// Distance from close to the block midpoint, as a fraction of it.
    pub dist_to_ob: Option<f64>,
    pub ob_width: Option<f64>,
    pub has_bos: bool,
    pub has_fvg: bool,
    pub timeframe_minutes: i64,
}

impl Features {
    /// `None` for an empty window.
    pub fn extract(
        candles: &[Candle],
        timeframe: Timeframe,
        order_block: Option<&OrderBlock>,
        has_bos: bool,
        has_fvg: bool,
    ) -> Option<Self> {
        let last = candles.last()?;
        let n = candles.len();

        let ret = |look: usize| {
            if n > look {
                let base = candles[n - look].close;
                (last.close - base) / base
            } else {
                0.0
            }
        };

        let tail = &candles[n.saturating_sub(14)..];
        let mean_range_14 = tail.iter().map(Candle::range).sum::<f64>() / tail.len() as f64;

        let (dist_to_ob, ob_width) = match order_block {
            Some(ob) => {
                let mid = ob.range.midpoint();
                (
                    Some((last.close - mid).abs() / mid),
                    Some(ob.range.width() / mid),
                )
            }
            None => (None, None),
        };

        Some(Self {
            open: last.open,
            high: last.high,
            low: last.low,
            close: last.close,
            volume: last.volume,
            ret_1: (last.close - last.open) / last.open,
            ret_3: ret(3),
            ret_5: ret(5),
            ret_10: ret(10),
            mean_range_14,
            dist_to_ob,
            ob_width,
            has_bos,
            has_fvg,
            timeframe_minutes: timeframe.minutes(),
        })
    }

    /// Flat vector for model inference. Missing block features use the
    /// sentinel 999.0 for distance and 0.0 for width.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ret_1,
            self.ret_3,
            self.ret_5,
            self.ret_10,
            self.mean_range_14,
            self.dist_to_ob.unwrap_or(999.0),
            self.ob_width.unwrap_or(0.0),
            f64::from(u8::from(self.has_bos)),
            f64::from(u8::from(self.has_fvg)),
            self.timeframe_minutes as f64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub side: Side,
    /// Probability in `0..=1`.
    pub probability: f64,
}

/// A trained classifier the caller may plug into evaluation.
pub trait SignalModel: Send + Sync {
    fn name(&self) -> &str;

    /// `None` when the model abstains.
    fn predict(&self, features: &Features) -> Option<ModelPrediction>;
}

/// Model that always abstains.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullModel;

impl SignalModel for NullModel {
    fn name(&self) -> &str {
        "null"
    }

    fn predict(&self, _features: &Features) -> Option<ModelPrediction> {
        None
    }
}
