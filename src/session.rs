use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::difficulty::DifficultyLevel;
use crate::engine::{self, Evaluation, EVALUATION_WINDOW};
use crate::puzzle::{Puzzle, PuzzleGenerator};
use crate::tracker::{AttemptRecord, PerformanceTracker, SessionSummary};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub learner: String,
    pub starting_difficulty: DifficultyLevel,
    pub max_questions: Option<usize>,
    pub seed: Option<u64>,
}

/// Outcome of one evaluation point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adaptation {
    pub at_attempt: usize,
    pub from: DifficultyLevel,
    pub to: DifficultyLevel,
    pub evaluation: Evaluation,
}

impl Adaptation {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Evaluations counted by where the tier actually went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdaptationSummary {
    pub evaluations: usize,
    pub increases: usize,
    pub decreases: usize,
    pub maintained: usize,
}

/// What the caller gets back after submitting an answer
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub record: AttemptRecord,
    pub adaptation: Option<Adaptation>,
}

/// One practice session: current tier, attempt log and adaptation history
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    difficulty: DifficultyLevel,
    generator: PuzzleGenerator,
    tracker: PerformanceTracker,
    adaptations: Vec<Adaptation>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            difficulty: config.starting_difficulty,
            generator: PuzzleGenerator::new(config.seed),
            tracker: PerformanceTracker::new(config.learner.clone()),
            adaptations: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub fn adaptations(&self) -> &[Adaptation] {
        &self.adaptations
    }

    pub fn next_puzzle(&mut self) -> Puzzle {
        self.generator.generate(self.difficulty)
    }

    /// Record an answer and adapt the tier if this attempt closes a window
    pub fn submit(&mut self, puzzle: &Puzzle, answer: i64, response_secs: f64) -> AttemptOutcome {
        let record = AttemptRecord::new(puzzle, answer, response_secs);
        self.tracker.record(record.clone());

        let adaptation = if self.tracker.len() % EVALUATION_WINDOW == 0 {
            self.evaluate()
        } else {
            None
        };

        AttemptOutcome { record, adaptation }
    }

    fn evaluate(&mut self) -> Option<Adaptation> {
        let evaluation = match engine::evaluate(self.tracker.recent(EVALUATION_WINDOW)) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                debug!("skipping adjustment: {e}");
                return None;
            }
        };

        let from = self.difficulty;
        let to = engine::apply(from, evaluation.decision);
        info!(
            score = evaluation.score,
            decision = %evaluation.decision,
            %from,
            %to,
            "difficulty evaluated"
        );
        self.difficulty = to;

        let adaptation = Adaptation {
            at_attempt: self.tracker.len(),
            from,
            to,
            evaluation,
        };
        self.adaptations.push(adaptation.clone());
        Some(adaptation)
    }

    /// Answers still needed before the next evaluation point
    pub fn questions_until_check(&self) -> usize {
        EVALUATION_WINDOW - self.tracker.len() % EVALUATION_WINDOW
    }

    pub fn is_finished(&self) -> bool {
        self.config
            .max_questions
            .is_some_and(|max| self.tracker.len() >= max)
    }

    pub fn adaptation_summary(&self) -> AdaptationSummary {
        self.adaptations
            .iter()
            .fold(AdaptationSummary::default(), |mut acc, a| {
                acc.evaluations += 1;
                match a.to.cmp(&a.from) {
                    Ordering::Greater => acc.increases += 1,
                    Ordering::Less => acc.decreases += 1,
                    Ordering::Equal => acc.maintained += 1,
                }
                acc
            })
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.tracker.summary(self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScoreDecision;

    fn session(start: DifficultyLevel) -> Session {
        Session::new(SessionConfig {
            learner: "ada".to_string(),
            starting_difficulty: start,
            max_questions: None,
            seed: Some(1),
        })
    }

    fn answer(session: &mut Session, correct: bool, secs: f64) -> AttemptOutcome {
        let puzzle = session.next_puzzle();
        let given = if correct {
            puzzle.answer()
        } else {
            puzzle.answer() + 1
        };
        session.submit(&puzzle, given, secs)
    }

    #[test]
    fn test_adapts_only_every_third_attempt() {
        let mut s = session(DifficultyLevel::Easy);
        assert!(answer(&mut s, true, 1.0).adaptation.is_none());
        assert_eq!(s.difficulty(), DifficultyLevel::Easy);
        assert!(answer(&mut s, true, 1.0).adaptation.is_none());
        assert_eq!(s.difficulty(), DifficultyLevel::Easy);

        let adaptation = answer(&mut s, true, 1.0).adaptation.unwrap();
        assert_eq!(adaptation.at_attempt, 3);
        assert_eq!(adaptation.from, DifficultyLevel::Easy);
        assert_eq!(adaptation.to, DifficultyLevel::Medium);
        assert!(adaptation.changed());
        assert_eq!(s.difficulty(), DifficultyLevel::Medium);
    }

    #[test]
    fn test_puzzles_follow_current_difficulty() {
        let mut s = session(DifficultyLevel::Easy);
        for _ in 0..3 {
            answer(&mut s, true, 1.0);
        }
        assert_eq!(s.next_puzzle().difficulty, DifficultyLevel::Medium);
    }

    #[test]
    fn test_never_exceeds_hard() {
        let mut s = session(DifficultyLevel::Hard);
        for _ in 0..9 {
            answer(&mut s, true, 1.0);
        }
        assert_eq!(s.difficulty(), DifficultyLevel::Hard);
        assert!(s
            .adaptations()
            .iter()
            .all(|a| a.evaluation.decision == ScoreDecision::Increase && !a.changed()));
        // an increase decision at HARD leaves the tier where it was
        let summary = s.adaptation_summary();
        assert_eq!(summary.increases, 0);
        assert_eq!(summary.maintained, 3);
    }

    #[test]
    fn test_never_drops_below_easy() {
        let mut s = session(DifficultyLevel::Medium);
        for _ in 0..9 {
            answer(&mut s, false, 30.0);
        }
        assert_eq!(s.difficulty(), DifficultyLevel::Easy);
        let summary = s.adaptation_summary();
        assert_eq!(summary.evaluations, 3);
        // MEDIUM -> EASY moves; the two later decreases are floored
        assert_eq!(summary.decreases, 1);
        assert_eq!(summary.maintained, 2);
    }

    #[test]
    fn test_mixed_window_maintains() {
        let mut s = session(DifficultyLevel::Medium);
        answer(&mut s, true, 8.0);
        answer(&mut s, false, 8.0);
        let adaptation = answer(&mut s, true, 8.0).adaptation.unwrap();
        assert!(!adaptation.changed());
        assert_eq!(s.adaptation_summary().maintained, 1);
    }

    #[test]
    fn test_questions_until_check() {
        let mut s = session(DifficultyLevel::Easy);
        assert_eq!(s.questions_until_check(), 3);
        answer(&mut s, true, 2.0);
        assert_eq!(s.questions_until_check(), 2);
        answer(&mut s, true, 2.0);
        assert_eq!(s.questions_until_check(), 1);
        answer(&mut s, true, 2.0);
        assert_eq!(s.questions_until_check(), 3);
    }

    #[test]
    fn test_question_limit() {
        let mut s = Session::new(SessionConfig {
            learner: "ada".to_string(),
            starting_difficulty: DifficultyLevel::Easy,
            max_questions: Some(2),
            seed: None,
        });
        assert!(!s.is_finished());
        answer(&mut s, true, 2.0);
        assert!(!s.is_finished());
        answer(&mut s, false, 2.0);
        assert!(s.is_finished());
    }

    #[test]
    fn test_summary_uses_current_difficulty() {
        let mut s = session(DifficultyLevel::Easy);
        assert!(s.summary().is_none());
        for _ in 0..3 {
            answer(&mut s, true, 1.0);
        }
        let summary = s.summary().unwrap();
        assert_eq!(summary.final_difficulty, DifficultyLevel::Medium);
        assert_eq!(
            summary.difficulty_progression,
            vec![DifficultyLevel::Easy; 3]
        );
    }
}
