use itertools::Itertools;
use std::cmp::Ordering;

use crate::difficulty::DifficultyLevel;
use crate::puzzle::Operator;
use crate::session::Adaptation;
use crate::tracker::{
    AttemptRecord, LearningVelocity, OperationStats, SessionSummary, Streak, StreakKind,
    WindowStats,
};

const LIGHTNING_SECS: f64 = 3.0;
const QUICK_SECS: f64 = 5.0;
const SLOW_AVERAGE_SECS: f64 = 15.0;

/// Answers needed before end-of-session advice is given
pub const RECOMMEND_MIN_QUESTIONS: usize = 3;

/// How a message should be styled on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Bad,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub tone: Tone,
    pub text: String,
}

impl Message {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

pub fn answer_feedback(record: &AttemptRecord) -> Vec<Message> {
    let secs = record.response_time_secs();
    if record.was_correct() {
        let text = if secs < LIGHTNING_SECS {
            format!("Correct! Lightning fast! ({secs:.1}s)")
        } else if secs < QUICK_SECS {
            format!("Correct! Great speed! ({secs:.1}s)")
        } else {
            format!("Correct! ({secs:.1}s)")
        };
        return vec![Message::new(Tone::Good, text)];
    }

    let mut messages = vec![Message::new(
        Tone::Bad,
        format!("Incorrect. The answer was {}", record.correct_answer()),
    )];
    if secs < LIGHTNING_SECS {
        messages.push(Message::new(
            Tone::Plain,
            "   Tip: take a moment to double-check your work!",
        ));
    }
    messages
}

/// Explanation for an evaluation that moved the learner to another tier,
/// `None` when the tier stayed put
pub fn adaptation_message(adaptation: &Adaptation) -> Option<String> {
    let accuracy = adaptation.evaluation.accuracy * 100.0;
    let headline = match (adaptation.from, adaptation.to) {
        (DifficultyLevel::Easy, DifficultyLevel::Medium) => {
            format!("Great progress! {accuracy:.0}% accuracy - advancing to MEDIUM")
        }
        (DifficultyLevel::Medium, DifficultyLevel::Hard) => {
            format!("Outstanding! {accuracy:.0}% accuracy - moving to HARD")
        }
        (DifficultyLevel::Medium, DifficultyLevel::Easy) => {
            "Adjusting to EASY for a better learning pace".to_string()
        }
        (DifficultyLevel::Hard, DifficultyLevel::Medium) => {
            "Adjusting to MEDIUM to keep things productive".to_string()
        }
        _ => return None,
    };

    if adaptation.evaluation.factors.is_empty() {
        Some(headline)
    } else {
        Some(format!(
            "{headline}\n   Factors: {}",
            adaptation.evaluation.factors.iter().join(", ")
        ))
    }
}

/// Streak-aware encouragement after an evaluation point
pub fn encouragement(stats: &WindowStats, streak: Option<Streak>) -> String {
    if let Some(streak) = streak.filter(Streak::is_significant) {
        return match streak.kind {
            StreakKind::Hot => format!("ON FIRE! {} correct in a row! Keep it up!", streak.length),
            StreakKind::Cold => {
                "Don't worry! Every expert was once a beginner. Let's try again!".to_string()
            }
        };
    }

    let accuracy = stats.accuracy * 100.0;
    if accuracy >= 90.0 {
        "Outstanding work! You're a math superstar!".to_string()
    } else if accuracy >= 75.0 {
        "Great job! Keep up the excellent work!".to_string()
    } else if accuracy >= 60.0 {
        "Good effort! You're making solid progress!".to_string()
    } else {
        "Keep practicing! Every mistake teaches us something new!".to_string()
    }
}

pub fn progress_hint(question: usize, until_check: usize) -> String {
    if until_check == 1 {
        format!("Progress: question {question}, difficulty is re-evaluated after this answer")
    } else {
        format!("Progress: question {question}, difficulty is re-evaluated in {until_check} questions")
    }
}

/// Trend line shown with milestone stats
pub fn milestone_note(velocity: &LearningVelocity) -> Option<&'static str> {
    match velocity {
        LearningVelocity::Improving { .. } => Some("You're improving! Keep it up!"),
        LearningVelocity::Stable { .. } => Some("Steady progress - you're consistent!"),
        LearningVelocity::Declining { .. } | LearningVelocity::InsufficientData => None,
    }
}

/// End-of-session advice from overall accuracy, speed and the per-operation
/// breakdown. Empty below [`RECOMMEND_MIN_QUESTIONS`] answers.
pub fn recommendations(summary: &SessionSummary) -> Vec<String> {
    if summary.total_questions < RECOMMEND_MIN_QUESTIONS {
        return Vec::new();
    }

    let accuracy = summary.accuracy_percentage;
    let (verdict, next_step) = if accuracy >= 85.0 {
        (
            "Outstanding! You're ready for more challenges!",
            "Consider starting at a higher difficulty next time.",
        )
    } else if accuracy >= 70.0 {
        (
            "Great work! You're making solid progress.",
            "Focus on maintaining this consistency.",
        )
    } else if accuracy >= 50.0 {
        (
            "Good effort! Keep practicing to improve.",
            "Try reviewing concepts at the current difficulty.",
        )
    } else {
        (
            "Every expert started as a beginner!",
            "Consider reviewing fundamentals and practicing more.",
        )
    };
    let mut advice = vec![verdict.to_string(), next_step.to_string()];

    if summary.average_time_secs < QUICK_SECS {
        advice.push("You're very quick! Great mental math skills!".to_string());
    } else if summary.average_time_secs > SLOW_AVERAGE_SECS {
        advice.push("Take your time, but try to build speed gradually.".to_string());
    }

    let breakdown = &summary.operation_breakdown;
    if breakdown.len() > 1 {
        // ties go to the operation listed first
        let weakest = breakdown.iter().min_by(by_accuracy);
        let strongest = breakdown.iter().rev().max_by(by_accuracy);

        if let Some((operator, stats)) = weakest.filter(|(_, s)| s.accuracy_percentage < 60.0) {
            advice.push(format!(
                "Focus area: {} ({:.0}% accuracy)",
                capitalized(operator),
                stats.accuracy_percentage
            ));
        }
        if let Some((operator, stats)) =
            strongest.filter(|(_, s)| s.accuracy_percentage >= 90.0)
        {
            advice.push(format!(
                "Strength: {} ({:.0}% accuracy)",
                capitalized(operator),
                stats.accuracy_percentage
            ));
        }
    }
    advice
}

fn by_accuracy(
    a: &(&Operator, &OperationStats),
    b: &(&Operator, &OperationStats),
) -> Ordering {
    a.1.accuracy_percentage.total_cmp(&b.1.accuracy_percentage)
}

fn capitalized(operator: &Operator) -> String {
    let name = operator.to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
