//! Walk-forward replay of the pipeline over a candle history.
//!
//! Every window is evaluated independently (in parallel when enabled, since
//! evaluation is pure). The duplicate filter is then applied sequentially in
//! time order, and every surviving candidate is labelled against the
//! candles that follow its window.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::dedup::{InMemorySignalStore, SignalStore};
use crate::domain::{validate_window, Candle, Category, Side, Timeframe, TradeCandidate};
use crate::error::SmcError;
use crate::model::SignalModel;
use crate::pipeline::{Evaluation, EvaluationInput, SignalPipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardParams {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Candles per evaluation window.
    pub window: usize,
    /// Distance between consecutive window ends.
    pub step: usize,
    /// Candles after the window used to label the outcome.
    pub forward_bars: usize,
    pub parallel: bool,
}

impl WalkForwardParams {
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            window: 200,
            step: 1,
            forward_bars: 12,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    Win,
    Loss,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSignal {
    pub candidate: TradeCandidate,
    pub outcome: TradeOutcome,
    /// Candles until the outcome resolved (the full horizon when expired).
    pub bars: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub windows: usize,
    pub signals: Vec<LabeledSignal>,
    pub outcomes: BTreeMap<TradeOutcome, usize>,
    pub categories: BTreeMap<Category, usize>,
    /// Rejection counts keyed by reason code.
    pub rejections: BTreeMap<String, usize>,
}

impl BacktestReport {
    pub fn count(&self, outcome: TradeOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Wins over resolved (win or loss) signals. `None` when nothing resolved.
    pub fn win_rate(&self) -> Option<f64> {
        let wins = self.count(TradeOutcome::Win);
        let resolved = wins + self.count(TradeOutcome::Loss);
        (resolved > 0).then(|| wins as f64 / resolved as f64)
    }
}

/// Label a candidate against the candles that follow it. The stop is
/// checked before the target, so a candle touching both is a loss.
pub fn label_outcome(candidate: &TradeCandidate, forward: &[Candle]) -> (TradeOutcome, usize) {
    for (i, c) in forward.iter().enumerate() {
        let (stopped, hit) = match candidate.side {
            Side::Buy => (c.low <= candidate.stop_loss, c.high >= candidate.take_profit),
            Side::Sell => (c.high >= candidate.stop_loss, c.low <= candidate.take_profit),
        };
        if stopped {
            return (TradeOutcome::Loss, i + 1);
        }
        if hit {
            return (TradeOutcome::Win, i + 1);
        }
    }
    (TradeOutcome::Expired, forward.len())
}

/// Reference candles at or before `until`, at most `window` of them.
pub fn aligned_reference<'a>(
    reference: &'a [Candle],
    until: &Candle,
    window: usize,
) -> &'a [Candle] {
    let end = reference.partition_point(|c| c.timestamp <= until.timestamp);
    &reference[end.saturating_sub(window)..end]
}

pub fn walk_forward(
    candles: &[Candle],
    reference: Option<&[Candle]>,
    params: &WalkForwardParams,
    pipeline: &SignalPipeline,
    model: Option<&dyn SignalModel>,
) -> Result<BacktestReport, SmcError> {
    if params.window == 0 || params.step == 0 {
        return Err(SmcError::InvalidConfig(
            "walk-forward window and step must be >= 1".into(),
        ));
    }
    validate_window(candles)?;
    if candles.len() < params.window {
        return Ok(BacktestReport::default());
    }

    let ends: Vec<usize> = (params.window - 1..candles.len()).step_by(params.step).collect();

    let evaluate = |&end: &usize| -> Result<(usize, Evaluation), SmcError> {
        let window = &candles[end + 1 - params.window..=end];
        let mut input = EvaluationInput::new(&params.symbol, params.timeframe, window);
        if let Some(r) = reference {
            let aligned = aligned_reference(r, &candles[end], params.window);
            if !aligned.is_empty() {
                input = input.with_reference(aligned);
            }
        }
        input.model = model;
        Ok((end, pipeline.evaluate(&input)?))
    };

    let evaluations: Vec<(usize, Evaluation)> = if params.parallel {
        ends.par_iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    } else {
        ends.iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    };

    let mut report = BacktestReport {
        windows: evaluations.len(),
        ..BacktestReport::default()
    };
    let filter = pipeline.duplicate_filter();
    let mut store = InMemorySignalStore::new();

    for (end, evaluation) in evaluations {
        *report.categories.entry(evaluation.category).or_default() += 1;

        let candidate = match evaluation.candidate() {
            Some(c) => c,
            None => {
                if let Some(reason) = evaluation.rejection() {
                    *report.rejections.entry(reason.code().to_string()).or_default() += 1;
                }
                continue;
            }
        };
        if filter.check(candidate, &store)? {
            *report.rejections.entry("duplicate_signal".to_string()).or_default() += 1;
            continue;
        }
        store.append(candidate)?;

        let horizon_end = (end + 1 + params.forward_bars).min(candles.len());
        let (outcome, bars) = label_outcome(candidate, &candles[end + 1..horizon_end]);
        *report.outcomes.entry(outcome).or_default() += 1;
        report.signals.push(LabeledSignal {
            candidate: candidate.clone(),
            outcome,
            bars,
        });
    }

    info!(
        symbol = %params.symbol,
        windows = report.windows,
        signals = report.signals.len(),
        wins = report.count(TradeOutcome::Win),
        losses = report.count(TradeOutcome::Loss),
        "walk-forward complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmcConfig;
    use crate::dedup::tests::candidate_at;
    use crate::indicators::{make_candles, make_ohlc};

    #[test]
    fn long_hits_target() {
        let c = candidate_at(0, Side::Buy, 100.0); // stop 0, target 300
        let forward = make_ohlc(&[(100.0, 150.0, 90.0, 140.0), (140.0, 301.0, 130.0, 290.0)]);
        assert_eq!(label_outcome(&c, &forward), (TradeOutcome::Win, 2));
    }

    #[test]
    fn stop_checked_before_target_in_same_candle() {
        let mut c = candidate_at(0, Side::Buy, 100.0);
        c.stop_loss = 95.0;
        c.take_profit = 110.0;
        let forward = make_ohlc(&[(100.0, 111.0, 94.0, 100.0)]);
        assert_eq!(label_outcome(&c, &forward), (TradeOutcome::Loss, 1));
    }

    #[test]
    fn short_outcomes() {
        let mut c = candidate_at(0, Side::Sell, 100.0);
        c.stop_loss = 105.0;
        c.take_profit = 90.0;
        let win = make_ohlc(&[(100.0, 101.0, 89.0, 90.0)]);
        assert_eq!(label_outcome(&c, &win).0, TradeOutcome::Win);
        let loss = make_ohlc(&[(100.0, 106.0, 99.0, 104.0)]);
        assert_eq!(label_outcome(&c, &loss).0, TradeOutcome::Loss);
        let flat = make_ohlc(&[(100.0, 101.0, 99.0, 100.0); 3]);
        assert_eq!(label_outcome(&c, &flat), (TradeOutcome::Expired, 3));
    }

    #[test]
    fn win_rate() {
        let mut report = BacktestReport::default();
        assert_eq!(report.win_rate(), None);
        report.outcomes.insert(TradeOutcome::Win, 3);
        report.outcomes.insert(TradeOutcome::Loss, 1);
        report.outcomes.insert(TradeOutcome::Expired, 10);
        assert_eq!(report.win_rate(), Some(0.75));
    }

    #[test]
    fn short_history_yields_empty_report() {
        let candles = make_candles(&[100.0; 10]);
        let pipeline = SignalPipeline::new(SmcConfig::default()).unwrap();
        let params = WalkForwardParams {
            window: 20,
            ..WalkForwardParams::new("BTC/USDT", Timeframe::M5)
        };
        let report = walk_forward(&candles, None, &params, &pipeline, None).unwrap();
        assert_eq!(report.windows, 0);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + ((i as f64) * 0.3).sin() * 5.0 + i as f64 * 0.05)
            .collect();
        let candles = make_candles(&closes);
        let pipeline = SignalPipeline::new(SmcConfig::default()).unwrap();
        let params = WalkForwardParams {
            window: 50,
            ..WalkForwardParams::new("BTC/USDT", Timeframe::M5)
        };
        let parallel = walk_forward(&candles, None, &params, &pipeline, None).unwrap();
        let sequential = walk_forward(
            &candles,
            None,
            &WalkForwardParams {
                parallel: false,
                ..params.clone()
            },
            &pipeline,
            None,
        )
        .unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.windows, 71);
        let categorized: usize = parallel.categories.values().sum();
        assert_eq!(categorized, 71);
    }

    #[test]
    fn reference_is_aligned_by_timestamp() {
        let reference = make_candles(&[100.0; 30]);
        let primary = make_candles(&[50.0; 20]);
        let aligned = aligned_reference(&reference, &primary[19], 5);
        assert_eq!(aligned.len(), 5);
        assert_eq!(aligned.last().unwrap().timestamp, primary[19].timestamp);
        assert_eq!(aligned[0].timestamp, reference[15].timestamp);

        // Fewer reference candles than the window before `until`.
        assert_eq!(aligned_reference(&reference, &primary[2], 10).len(), 3);
        assert!(aligned_reference(&reference[25..], &primary[2], 10).is_empty());
    }

    #[test]
    fn zero_step_is_rejected() {
        let candles = make_candles(&[100.0; 10]);
        let pipeline = SignalPipeline::new(SmcConfig::default()).unwrap();
        let params = WalkForwardParams {
            step: 0,
            ..WalkForwardParams::new("BTC/USDT", Timeframe::M5)
        };
        assert!(walk_forward(&candles, None, &params, &pipeline, None).is_err());
    }
}
