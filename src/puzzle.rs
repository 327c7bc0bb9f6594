use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::difficulty::DifficultyLevel;

/// Arithmetic operation a puzzle asks for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Operator {
    #[serde(rename = "addition")]
    #[strum(to_string = "addition")]
    Add,
    #[serde(rename = "subtraction")]
    #[strum(to_string = "subtraction")]
    Subtract,
    #[serde(rename = "multiplication")]
    #[strum(to_string = "multiplication")]
    Multiply,
    #[serde(rename = "division")]
    #[strum(to_string = "division")]
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
            Operator::Divide => '÷',
        }
    }

    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            // divisors are never zero and always divide evenly
            Operator::Divide => left / right,
        }
    }
}

/// A single question shown to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Puzzle {
    pub left: i64,
    pub right: i64,
    pub operator: Operator,
    pub difficulty: DifficultyLevel,
}

impl Puzzle {
    pub fn new(left: i64, operator: Operator, right: i64, difficulty: DifficultyLevel) -> Self {
        Self {
            left,
            right,
            operator,
            difficulty,
        }
    }

    pub fn answer(&self) -> i64 {
        self.operator.apply(self.left, self.right)
    }

    pub fn is_correct(&self, given: i64) -> bool {
        given == self.answer()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

/// Produces puzzles for a given tier
#[derive(Debug)]
pub struct PuzzleGenerator {
    rng: StdRng,
}

impl PuzzleGenerator {
    /// Seeded generators yield the same puzzle sequence for the same tiers
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn generate(&mut self, difficulty: DifficultyLevel) -> Puzzle {
        let operator = difficulty
            .operators()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Operator::Add);

        match operator {
            Operator::Add => {
                let (left, right) = self.operands(difficulty);
                Puzzle::new(left, operator, right, difficulty)
            }
            Operator::Subtract => {
                let (mut left, mut right) = self.operands(difficulty);
                if difficulty == DifficultyLevel::Easy && left < right {
                    std::mem::swap(&mut left, &mut right);
                }
                Puzzle::new(left, operator, right, difficulty)
            }
            Operator::Multiply => {
                let left = self.rng.gen_range(2..=12);
                let right = self.rng.gen_range(2..=12);
                Puzzle::new(left, operator, right, difficulty)
            }
            Operator::Divide => {
                let divisor = self.rng.gen_range(2..=10);
                let quotient = self.rng.gen_range(2..=10);
                Puzzle::new(divisor * quotient, operator, divisor, difficulty)
            }
        }
    }

    fn operands(&mut self, difficulty: DifficultyLevel) -> (i64, i64) {
        let (min, max) = difficulty.operand_range();
        (
            self.rng.gen_range(min..=max),
            self.rng.gen_range(min..=max),
        )
    }
}

impl Default for PuzzleGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}
