pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};
use serde::Serialize;

use crate::difficulty::DifficultyLevel;
use crate::feedback;
use crate::session::{Adaptation, AdaptationSummary, Session};
use crate::tracker::{AttemptRecord, SessionSummary};

/// Rows the inline chart viewport occupies
pub const CHART_HEIGHT: u16 = 14;

const RULE_WIDTH: usize = 50;

/// Everything reported at the end of a session
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub summary: SessionSummary,
    pub adaptation: AdaptationSummary,
    pub history: &'a [Adaptation],
    pub attempts: &'a [AttemptRecord],
    pub recommendations: Vec<String>,
}

impl<'a> SessionReport<'a> {
    /// `None` when nothing was answered
    pub fn from_session(session: &'a Session) -> Option<Self> {
        let summary = session.summary()?;
        Some(Self {
            recommendations: feedback::recommendations(&summary),
            summary,
            adaptation: session.adaptation_summary(),
            history: session.adaptations(),
            attempts: session.tracker().attempts(),
        })
    }

    /// Plain-text summary, one entry per output line
    pub fn lines(&self) -> Vec<String> {
        let s = &self.summary;
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            String::new(),
            rule.clone(),
            format!("SESSION SUMMARY FOR {}", s.learner.to_uppercase()),
            rule.clone(),
            format!("Total questions: {}", s.total_questions),
            format!("Correct answers: {}", s.correct_answers),
            format!("Accuracy: {:.1}%", s.accuracy_percentage),
            format!(
                "Average time per question: {:.1} seconds (sd {:.1})",
                s.average_time_secs, s.response_time_std_dev
            ),
            format!("Final difficulty: {}", s.final_difficulty),
            format!("Session duration: {}", format_duration(s.session_duration_secs)),
            format!("Difficulty progression: {}", s.progression_label()),
            format!("Learning trend: {}", s.learning_velocity),
            "By operation:".to_string(),
        ];
        lines.extend(s.operation_breakdown.iter().map(|(operator, stats)| {
            format!(
                "  {:<15}{:>3}/{:<3} ({:.1}%)",
                operator.to_string(),
                stats.correct,
                stats.total,
                stats.accuracy_percentage
            )
        }));
        lines.push(format!(
            "Difficulty checks: {} ({} up, {} down, {} held)",
            self.adaptation.evaluations,
            self.adaptation.increases,
            self.adaptation.decreases,
            self.adaptation.maintained
        ));
        if !self.recommendations.is_empty() {
            lines.push(String::new());
            lines.push("PERSONALIZED RECOMMENDATIONS:".to_string());
            lines.extend(self.recommendations.iter().map(|advice| format!("  - {advice}")));
        }
        lines.push(rule);
        lines
    }

    /// (question number, seconds) per tier, in answer order
    pub fn response_points(&self) -> Vec<(DifficultyLevel, Vec<(f64, f64)>)> {
        DifficultyLevel::ALL
            .iter()
            .map(|&level| {
                let points = self
                    .attempts
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| a.difficulty() == level)
                    .map(|(idx, a)| ((idx + 1) as f64, a.response_time_secs()))
                    .collect::<Vec<(f64, f64)>>();
                (level, points)
            })
            .filter(|(_, points)| !points.is_empty())
            .collect()
    }
}

pub fn format_duration(secs: i64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{}h {}m", s / 3600, (s % 3600) / 60),
    }
}

fn level_color(level: DifficultyLevel) -> Color {
    match level {
        DifficultyLevel::Easy => Color::Green,
        DifficultyLevel::Medium => Color::Yellow,
        DifficultyLevel::Hard => Color::Red,
    }
}

impl Widget for &SessionReport<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);

        let series = self.response_points();
        let all_points = series
            .iter()
            .flat_map(|(_, points)| points.iter().copied())
            .collect::<Vec<(f64, f64)>>();
        let (last_question, slowest) = charting::compute_chart_params(&all_points);

        let datasets = series
            .iter()
            .map(|(level, points)| {
                Dataset::default()
                    .name(level.to_string())
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(level_color(*level)))
                    .data(points)
            })
            .collect::<Vec<Dataset>>();

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Response times"),
            )
            .x_axis(
                Axis::default()
                    .title("question")
                    .bounds([1.0, last_question])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(charting::format_label(last_question), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([0.0, slowest])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(slowest), bold_style),
                    ]),
            );

        chart.render(chunks[0], buf);

        let s = &self.summary;
        let stats = Paragraph::new(Span::styled(
            format!(
                "{:.0}% acc   {:.1}s avg   final {}",
                s.accuracy_percentage, s.average_time_secs, s.final_difficulty
            ),
            italic_style,
        ))
        .alignment(Alignment::Center);

        stats.render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    fn played_session() -> Session {
        let mut session = Session::new(SessionConfig {
            learner: "ada".to_string(),
            starting_difficulty: DifficultyLevel::Easy,
            max_questions: None,
            seed: Some(9),
        });
        for secs in [1.0, 2.0, 3.0, 6.0] {
            let puzzle = session.next_puzzle();
            session.submit(&puzzle, puzzle.answer(), secs);
        }
        session
    }

    fn rendered(report: &SessionReport, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        report.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_no_report_without_attempts() {
        let session = Session::new(SessionConfig {
            learner: "ada".to_string(),
            starting_difficulty: DifficultyLevel::Easy,
            max_questions: None,
            seed: None,
        });
        assert!(SessionReport::from_session(&session).is_none());
    }

    #[test]
    fn test_summary_lines() {
        let session = played_session();
        let report = SessionReport::from_session(&session).unwrap();
        let text = report.lines().join("\n");

        assert!(text.contains("SESSION SUMMARY FOR ADA"));
        assert!(text.contains("Total questions: 4"));
        assert!(text.contains("Correct answers: 4"));
        assert!(text.contains("Accuracy: 100.0%"));
        assert!(text.contains("Average time per question: 3.0 seconds"));
        assert!(text.contains("Final difficulty: MEDIUM"));
        assert!(text.contains("Difficulty progression: EASY ×3 → MEDIUM ×1"));
        assert!(text.contains("Difficulty checks: 1 (1 up, 0 down, 0 held)"));
        assert!(text.contains("By operation:"));
        assert!(text.contains("PERSONALIZED RECOMMENDATIONS:"));
        assert!(text.contains("  - Outstanding! You're ready for more challenges!"));
        assert!(text.contains("  - You're very quick! Great mental math skills!"));
    }

    fn wrong_answers(count: usize) -> Session {
        let mut session = Session::new(SessionConfig {
            learner: "ada".to_string(),
            starting_difficulty: DifficultyLevel::Easy,
            max_questions: None,
            seed: Some(3),
        });
        for _ in 0..count {
            let puzzle = session.next_puzzle();
            session.submit(&puzzle, puzzle.answer() + 1, 8.0);
        }
        session
    }

    #[test]
    fn test_floored_decreases_count_as_held() {
        let session = wrong_answers(6);
        let report = SessionReport::from_session(&session).unwrap();
        let text = report.lines().join("\n");
        assert!(text.contains("Final difficulty: EASY"));
        assert!(text.contains("Difficulty checks: 2 (0 up, 0 down, 2 held)"));
        assert!(text.contains("  - Every expert started as a beginner!"));
    }

    #[test]
    fn test_no_recommendations_for_short_sessions() {
        let session = wrong_answers(2);
        let report = SessionReport::from_session(&session).unwrap();
        assert!(report.recommendations.is_empty());
        assert!(!report
            .lines()
            .iter()
            .any(|line| line.contains("RECOMMENDATIONS")));
    }

    #[test]
    fn test_response_points_split_by_tier() {
        let session = played_session();
        let report = SessionReport::from_session(&session).unwrap();
        let series = report.response_points();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, DifficultyLevel::Easy);
        assert_eq!(series[0].1, vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(series[1].0, DifficultyLevel::Medium);
        assert_eq!(series[1].1, vec![(4.0, 6.0)]);
    }

    #[test]
    fn test_report_serializes() {
        let session = played_session();
        let report = SessionReport::from_session(&session).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_questions"], 4);
        assert_eq!(json["adaptation"]["increases"], 1);
        assert_eq!(json["history"][0]["to"], "medium");
        assert_eq!(json["history"][0]["evaluation"]["decision"], "increase");
        assert_eq!(json["attempts"].as_array().unwrap().len(), 4);
        assert_eq!(
            json["recommendations"][0],
            "Outstanding! You're ready for more challenges!"
        );
    }

    #[test]
    fn test_widget_renders_chart() {
        let session = played_session();
        let report = SessionReport::from_session(&session).unwrap();
        let text = rendered(&report, 70, CHART_HEIGHT);
        assert!(text.contains("Response times"));
        assert!(text.contains("100% acc"));
        assert!(text.contains("final MEDIUM"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(95), "1m 35s");
        assert_eq!(format_duration(3720), "1h 2m");
    }
}
