//! The evaluation pipeline: detectors, aggregation, classification, gates,
//! confirmation and trade levels, then optionally the duplicate filter.
//!
//! `evaluate` is a pure function of its input and the pipeline's config.
//! `run` adds the read-then-write against a [`SignalStore`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::classify;
use crate::config::SmcConfig;
use crate::confirmation::{AlwaysReject, ConfirmationPolicy};
use crate::confluence::{aggregate, AggregateContext, ConfluenceResult, MarketStructure};
use crate::dedup::{DuplicateFilter, SignalStore};
use crate::domain::{
    validate_window, CandidateId, Candle, Category, RejectionReason, Timeframe, TradeCandidate,
};
use crate::error::SmcError;
use crate::indicators::atr_last;
use crate::model::SignalModel;
use crate::trade_params::compute_levels;

/// One window to evaluate.
#[derive(Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub symbol: &'a str,
    pub timeframe: Timeframe,
    pub candles: &'a [Candle],
    /// Correlated instrument for SMT divergence.
    pub reference: Option<&'a [Candle]>,
    pub model: Option<&'a dyn SignalModel>,
}

impl<'a> EvaluationInput<'a> {
    pub fn new(symbol: &'a str, timeframe: Timeframe, candles: &'a [Candle]) -> Self {
        Self {
            symbol,
            timeframe,
            candles,
            reference: None,
            model: None,
        }
    }

    pub fn with_reference(mut self, reference: &'a [Candle]) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_model(mut self, model: &'a dyn SignalModel) -> Self {
        self.model = Some(model);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Accepted(TradeCandidate),
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub confluence: ConfluenceResult,
    pub category: Category,
    pub outcome: Outcome,
    pub reason: String,
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted(_))
    }

    pub fn candidate(&self) -> Option<&TradeCandidate> {
        match &self.outcome {
            Outcome::Accepted(c) => Some(c),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self.outcome {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(r) => Some(r),
        }
    }

    fn reject(mut self, reason: RejectionReason) -> Self {
        self.reason = format!("{}: {}", reason.code(), self.confluence.reason());
        self.outcome = Outcome::Rejected(reason);
        self
    }
}

pub struct SignalPipeline {
    config: SmcConfig,
    confirmation: Box<dyn ConfirmationPolicy>,
    filter: DuplicateFilter,
}

impl SignalPipeline {
    /// Validates the config. Confirmation defaults to [`AlwaysReject`].
    pub fn new(config: SmcConfig) -> Result<Self, SmcError> {
        config.validate()?;
        let filter = DuplicateFilter::from_config(&config.duplicate);
        Ok(Self {
            config,
            confirmation: Box::new(AlwaysReject),
            filter,
        })
    }

    pub fn with_confirmation(mut self, policy: impl ConfirmationPolicy + 'static) -> Self {
        self.confirmation = Box::new(policy);
        self
    }

    pub fn config(&self) -> &SmcConfig {
        &self.config
    }

    pub fn duplicate_filter(&self) -> &DuplicateFilter {
        &self.filter
    }

    /// Evaluate one window. Structurally invalid input is an error; every
    /// other non-trade is a rejection outcome.
    pub fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<Evaluation, SmcError> {
        validate_window(input.candles)?;
        if let Some(reference) = input.reference {
            validate_window(reference)?;
        }
        let candles = input.candles;
        let config = &self.config;

        let structure = MarketStructure::scan(candles, input.reference, config);
        let ctx = AggregateContext {
            candles,
            timeframe: input.timeframe,
            model: input.model,
        };
        let confluence = aggregate(&ctx, &structure, config);
        let (category, actionable) =
            classify(confluence.score, config.scoring.actionable_threshold);

        let pending = Evaluation {
            reason: confluence.reason(),
            confluence,
            category,
            outcome: Outcome::Rejected(RejectionReason::InsufficientConfluence),
        };

        let evaluation = match self.decide(input, &structure, actionable, &pending) {
            Ok(candidate) => Evaluation {
                outcome: Outcome::Accepted(candidate),
                ..pending
            },
            Err(reason) => pending.reject(reason),
        };

        match &evaluation.outcome {
            Outcome::Accepted(c) => debug!(
                symbol = input.symbol,
                timeframe = %input.timeframe.as_str(),
                side = %c.side,
                entry = c.entry,
                score = c.score,
                "candidate accepted"
            ),
            Outcome::Rejected(reason) => debug!(
                symbol = input.symbol,
                timeframe = %input.timeframe.as_str(),
                reason = reason.code(),
                score = evaluation.confluence.score,
                "window rejected"
            ),
        }
        Ok(evaluation)
    }

    fn decide(
        &self,
        input: &EvaluationInput<'_>,
        structure: &MarketStructure,
        actionable: bool,
        pending: &Evaluation,
    ) -> Result<TradeCandidate, RejectionReason> {
        let config = &self.config;
        let confluence = &pending.confluence;

        if let Some(gate) = confluence.first_failed_gate() {
            return Err(gate);
        }
        let side = match confluence.side {
            Some(side) if actionable => side,
            _ => return Err(RejectionReason::InsufficientConfluence),
        };
        if config.require_confirmation
            && !self.confirmation.confirm(input.candles, side, structure)
        {
            return Err(RejectionReason::NotConfirmed);
        }

        let last = input.candles.last().ok_or(RejectionReason::InvalidTradeLevels)?;
        let entry = last.close;
        let levels = compute_levels(
            side,
            entry,
            structure.stop_block(side, entry),
            atr_last(input.candles, config.trade.atr_period),
            &config.trade,
            config.instrument.price_increment,
        )?;

        Ok(TradeCandidate {
            id: CandidateId::derive(input.symbol, input.timeframe, side, entry, last.timestamp),
            symbol: input.symbol.to_string(),
            timeframe: input.timeframe,
            side,
            entry: levels.entry,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            take_profits: levels.take_profits,
            risk_reward: levels.risk_reward,
            confidence: confluence.weighted_score,
            category: pending.category,
            score: confluence.score,
            confluences: confluence.confluences.clone(),
            reason: confluence.reason(),
            created_at: last.timestamp,
        })
    }

    /// Evaluate, then drop duplicates against `store` and append accepted
    /// candidates to it.
    pub fn run(
        &self,
        input: &EvaluationInput<'_>,
        store: &mut dyn SignalStore,
    ) -> Result<Evaluation, SmcError> {
        let evaluation = self.evaluate(input)?;
        let Some(candidate) = evaluation.candidate() else {
            return Ok(evaluation);
        };
        if self.filter.check(candidate, store)? {
            debug!(
                symbol = input.symbol,
                entry = candidate.entry,
                "duplicate candidate suppressed"
            );
            return Ok(evaluation.reject(RejectionReason::DuplicateSignal));
        }
        store.append(candidate)?;
        Ok(evaluation)
    }
}
