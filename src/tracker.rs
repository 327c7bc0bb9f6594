use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::difficulty::DifficultyLevel;
use crate::puzzle::{Operator, Puzzle};
use crate::util::{mean, ratio, std_dev};

/// Run length at which a streak is worth calling out
pub const STREAK_THRESHOLD: usize = 3;

/// Minimum attempts before a learning trend is reported
const VELOCITY_MIN_ATTEMPTS: usize = 4;

/// Accuracy difference between session halves that counts as a trend
const VELOCITY_MARGIN: f64 = 0.1;

/// One answered question. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    was_correct: bool,
    response_time_secs: f64,
    difficulty: DifficultyLevel,
    operator: Operator,
    given_answer: i64,
    correct_answer: i64,
    answered_at: DateTime<Local>,
}

impl AttemptRecord {
    /// Negative or NaN response times are recorded as zero
    pub fn new(puzzle: &Puzzle, given_answer: i64, response_time_secs: f64) -> Self {
        Self {
            was_correct: puzzle.is_correct(given_answer),
            response_time_secs: response_time_secs.max(0.0),
            difficulty: puzzle.difficulty,
            operator: puzzle.operator,
            given_answer,
            correct_answer: puzzle.answer(),
            answered_at: Local::now(),
        }
    }

    pub fn was_correct(&self) -> bool {
        self.was_correct
    }

    pub fn response_time_secs(&self) -> f64 {
        self.response_time_secs
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn given_answer(&self) -> i64 {
        self.given_answer
    }

    pub fn correct_answer(&self) -> i64 {
        self.correct_answer
    }

    pub fn answered_at(&self) -> DateTime<Local> {
        self.answered_at
    }
}

/// Aggregates over the last few attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub count: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Hot,
    Cold,
}

/// Run of identical outcomes ending at the latest attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub length: usize,
}

impl Streak {
    pub fn is_significant(&self) -> bool {
        self.length >= STREAK_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperationStats {
    pub total: usize,
    pub correct: usize,
    pub accuracy_percentage: f64,
}

/// Accuracy trend between the first and second half of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "trend", rename_all = "snake_case")]
pub enum LearningVelocity {
    InsufficientData,
    Improving {
        start_accuracy: f64,
        end_accuracy: f64,
    },
    Declining {
        start_accuracy: f64,
        end_accuracy: f64,
    },
    Stable {
        start_accuracy: f64,
        end_accuracy: f64,
    },
}

impl fmt::Display for LearningVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningVelocity::InsufficientData => write!(f, "not enough questions yet"),
            LearningVelocity::Improving {
                start_accuracy,
                end_accuracy,
            } => write!(
                f,
                "improving ({:.0}% → {:.0}%)",
                start_accuracy * 100.0,
                end_accuracy * 100.0
            ),
            LearningVelocity::Declining {
                start_accuracy,
                end_accuracy,
            } => write!(
                f,
                "declining ({:.0}% → {:.0}%)",
                start_accuracy * 100.0,
                end_accuracy * 100.0
            ),
            LearningVelocity::Stable { end_accuracy, .. } => {
                write!(f, "stable (around {:.0}%)", end_accuracy * 100.0)
            }
        }
    }
}

/// End-of-session statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub learner: String,
    pub started_at: DateTime<Local>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy_percentage: f64,
    pub average_time_secs: f64,
    pub response_time_std_dev: f64,
    pub final_difficulty: DifficultyLevel,
    pub difficulty_progression: Vec<DifficultyLevel>,
    pub session_duration_secs: i64,
    pub operation_breakdown: BTreeMap<Operator, OperationStats>,
    pub learning_velocity: LearningVelocity,
}

impl SessionSummary {
    /// Progression with consecutive repeats collapsed, e.g. `EASY ×3 → MEDIUM ×2`
    pub fn progression_label(&self) -> String {
        self.difficulty_progression
            .iter()
            .dedup_with_count()
            .map(|(count, level)| format!("{level} ×{count}"))
            .join(" → ")
    }
}

/// Append-only log of attempts for one learner
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    learner: String,
    started_at: DateTime<Local>,
    attempts: Vec<AttemptRecord>,
}

impl PerformanceTracker {
    pub fn new(learner: impl Into<String>) -> Self {
        Self {
            learner: learner.into(),
            started_at: Local::now(),
            attempts: Vec::new(),
        }
    }

    pub fn learner(&self) -> &str {
        &self.learner
    }

    pub fn record(&mut self, attempt: AttemptRecord) {
        debug!(
            correct = attempt.was_correct,
            secs = attempt.response_time_secs,
            difficulty = %attempt.difficulty,
            "attempt recorded"
        );
        self.attempts.push(attempt);
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// The last `n` attempts, or all of them when fewer exist
    pub fn recent(&self, n: usize) -> &[AttemptRecord] {
        let start = self.attempts.len().saturating_sub(n);
        &self.attempts[start..]
    }

    pub fn window_stats(&self, n: usize) -> Option<WindowStats> {
        let recent = self.recent(n);
        if recent.is_empty() {
            return None;
        }
        let correct = recent.iter().filter(|a| a.was_correct).count();
        let times = recent
            .iter()
            .map(|a| a.response_time_secs)
            .collect::<Vec<f64>>();

        Some(WindowStats {
            count: recent.len(),
            correct,
            accuracy: ratio(correct, recent.len()),
            average_secs: mean(&times).unwrap_or(0.0),
        })
    }

    pub fn current_streak(&self) -> Option<Streak> {
        let last = self.attempts.last()?;
        let length = self
            .attempts
            .iter()
            .rev()
            .take_while(|a| a.was_correct == last.was_correct)
            .count();
        let kind = if last.was_correct {
            StreakKind::Hot
        } else {
            StreakKind::Cold
        };
        Some(Streak { kind, length })
    }

    pub fn operation_breakdown(&self) -> BTreeMap<Operator, OperationStats> {
        self.attempts
            .iter()
            .into_group_map_by(|a| a.operator)
            .into_iter()
            .map(|(operator, attempts)| {
                let correct = attempts.iter().filter(|a| a.was_correct).count();
                let stats = OperationStats {
                    total: attempts.len(),
                    correct,
                    accuracy_percentage: ratio(correct, attempts.len()) * 100.0,
                };
                (operator, stats)
            })
            .collect()
    }

    pub fn learning_velocity(&self) -> LearningVelocity {
        if self.attempts.len() < VELOCITY_MIN_ATTEMPTS {
            return LearningVelocity::InsufficientData;
        }
        let (first, second) = self.attempts.split_at(self.attempts.len() / 2);
        let accuracy = |half: &[AttemptRecord]| {
            ratio(half.iter().filter(|a| a.was_correct).count(), half.len())
        };
        let start_accuracy = accuracy(first);
        let end_accuracy = accuracy(second);

        if end_accuracy > start_accuracy + VELOCITY_MARGIN {
            LearningVelocity::Improving {
                start_accuracy,
                end_accuracy,
            }
        } else if start_accuracy > end_accuracy + VELOCITY_MARGIN {
            LearningVelocity::Declining {
                start_accuracy,
                end_accuracy,
            }
        } else {
            LearningVelocity::Stable {
                start_accuracy,
                end_accuracy,
            }
        }
    }

    pub fn summary(&self, final_difficulty: DifficultyLevel) -> Option<SessionSummary> {
        self.summary_at(final_difficulty, Local::now())
    }

    pub fn summary_at(
        &self,
        final_difficulty: DifficultyLevel,
        now: DateTime<Local>,
    ) -> Option<SessionSummary> {
        if self.attempts.is_empty() {
            return None;
        }
        let total = self.attempts.len();
        let correct = self.attempts.iter().filter(|a| a.was_correct).count();
        let times = self
            .attempts
            .iter()
            .map(|a| a.response_time_secs)
            .collect::<Vec<f64>>();

        Some(SessionSummary {
            learner: self.learner.clone(),
            started_at: self.started_at,
            total_questions: total,
            correct_answers: correct,
            accuracy_percentage: ratio(correct, total) * 100.0,
            average_time_secs: mean(&times).unwrap_or(0.0),
            response_time_std_dev: std_dev(&times).unwrap_or(0.0),
            final_difficulty,
            difficulty_progression: self.attempts.iter().map(|a| a.difficulty).collect(),
            session_duration_secs: (now - self.started_at).num_seconds().max(0),
            operation_breakdown: self.operation_breakdown(),
            learning_velocity: self.learning_velocity(),
        })
    }
}
