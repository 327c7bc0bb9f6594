//! Rule-based difficulty adaptation.
//!
//! The engine looks at the three most recent attempts and scores them:
//!
//! | rule                                   | score |
//! |----------------------------------------|-------|
//! | accuracy >= 80%                        | +2    |
//! | accuracy <= 50%                        | -2    |
//! | accuracy >= 80% and average time < 5s  | +1    |
//! | average time > 15s                     | -1    |
//!
//! A score of at least 2 raises the difficulty one tier, at most -2 lowers
//! it one tier, anything in between keeps it. Evaluation has no side effects.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::difficulty::DifficultyLevel;
use crate::tracker::AttemptRecord;
use crate::util::{mean, ratio};

/// Number of attempts each evaluation looks at
pub const EVALUATION_WINDOW: usize = 3;

const HIGH_ACCURACY: f64 = 0.80;
const LOW_ACCURACY: f64 = 0.50;
const FAST_SECS: f64 = 5.0;
const SLOW_SECS: f64 = 15.0;

const INCREASE_AT: i32 = 2;
const DECREASE_AT: i32 = -2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("need {needed} attempts to evaluate, only {available} recorded")]
    InsufficientData { needed: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreDecision {
    Increase,
    Decrease,
    Maintain,
}

/// A scoring rule that fired during evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Factor {
    HighAccuracy { accuracy: f64 },
    LowAccuracy { accuracy: f64 },
    FastResponses { average_secs: f64 },
    SlowResponses { average_secs: f64 },
}

impl Factor {
    pub fn weight(&self) -> i32 {
        match self {
            Factor::HighAccuracy { .. } => 2,
            Factor::LowAccuracy { .. } => -2,
            Factor::FastResponses { .. } => 1,
            Factor::SlowResponses { .. } => -1,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::HighAccuracy { accuracy } => {
                write!(f, "High accuracy ({:.0}%)", accuracy * 100.0)
            }
            Factor::LowAccuracy { accuracy } => {
                write!(f, "Low accuracy ({:.0}%)", accuracy * 100.0)
            }
            Factor::FastResponses { average_secs } => {
                write!(f, "Fast responses ({average_secs:.1}s avg)")
            }
            Factor::SlowResponses { average_secs } => {
                write!(f, "Slow responses ({average_secs:.1}s avg)")
            }
        }
    }
}

/// Result of scoring one window of attempts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub average_response_secs: f64,
    pub score: i32,
    pub decision: ScoreDecision,
    pub factors: Vec<Factor>,
}

/// Score the last [`EVALUATION_WINDOW`] attempts of `attempts`.
///
/// Earlier attempts in the slice are ignored.
pub fn evaluate(attempts: &[AttemptRecord]) -> Result<Evaluation, EngineError> {
    if attempts.len() < EVALUATION_WINDOW {
        return Err(EngineError::InsufficientData {
            needed: EVALUATION_WINDOW,
            available: attempts.len(),
        });
    }
    let window = &attempts[attempts.len() - EVALUATION_WINDOW..];

    let correct = window.iter().filter(|a| a.was_correct()).count();
    let accuracy = ratio(correct, EVALUATION_WINDOW);
    let times = window
        .iter()
        .map(AttemptRecord::response_time_secs)
        .collect::<Vec<f64>>();
    let average_secs = mean(&times).unwrap_or(0.0);

    let mut factors = Vec::new();
    if accuracy >= HIGH_ACCURACY {
        factors.push(Factor::HighAccuracy { accuracy });
    } else if accuracy <= LOW_ACCURACY {
        factors.push(Factor::LowAccuracy { accuracy });
    }
    if accuracy >= HIGH_ACCURACY && average_secs < FAST_SECS {
        factors.push(Factor::FastResponses { average_secs });
    }
    if average_secs > SLOW_SECS {
        factors.push(Factor::SlowResponses { average_secs });
    }

    let score = factors.iter().map(Factor::weight).sum::<i32>();
    let decision = if score >= INCREASE_AT {
        ScoreDecision::Increase
    } else if score <= DECREASE_AT {
        ScoreDecision::Decrease
    } else {
        ScoreDecision::Maintain
    };

    Ok(Evaluation {
        accuracy,
        average_response_secs: average_secs,
        score,
        decision,
        factors,
    })
}

/// Apply a decision to a tier, saturating at `Easy` and `Hard`
pub fn apply(current: DifficultyLevel, decision: ScoreDecision) -> DifficultyLevel {
    match decision {
        ScoreDecision::Increase => current.harder(),
        ScoreDecision::Decrease => current.easier(),
        ScoreDecision::Maintain => current,
    }
}
