use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::puzzle::Operator;

/// Difficulty tier controlling operand ranges and allowed operations.
///
/// Ordered `Easy < Medium < Hard`; stepping past either end saturates.
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
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    /// Map a menu selection (`1`, `2` or `3`) to a tier
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(DifficultyLevel::Easy),
            "2" => Some(DifficultyLevel::Medium),
            "3" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }

    pub fn harder(self) -> Self {
        match self {
            DifficultyLevel::Easy => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Hard => DifficultyLevel::Hard,
        }
    }

    pub fn easier(self) -> Self {
        match self {
            DifficultyLevel::Hard => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Easy => DifficultyLevel::Easy,
        }
    }

    /// Inclusive range operands are drawn from for addition and subtraction
    pub fn operand_range(self) -> (i64, i64) {
        match self {
            DifficultyLevel::Easy => (1, 10),
            DifficultyLevel::Medium => (5, 50),
            DifficultyLevel::Hard => (10, 100),
        }
    }

    pub fn operators(self) -> &'static [Operator] {
        match self {
            DifficultyLevel::Easy => &[Operator::Add, Operator::Subtract],
            DifficultyLevel::Medium => &[Operator::Add, Operator::Subtract, Operator::Multiply],
            DifficultyLevel::Hard => &[
                Operator::Add,
                Operator::Subtract,
                Operator::Multiply,
                Operator::Divide,
            ],
        }
    }

    /// One-line description used by the starting menu
    pub fn blurb(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Addition and subtraction with small numbers",
            DifficultyLevel::Medium => "Includes multiplication",
            DifficultyLevel::Hard => "All operations including division",
        }
    }
}
