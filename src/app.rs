use crossterm::style::{style, Stylize};
use std::io::{self, Write};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::difficulty::DifficultyLevel;
use crate::error::Result;
use crate::feedback::{self, Message, Tone};
use crate::puzzle::Puzzle;
use crate::runtime::{LineSource, ResponseTimer};
use crate::session::{Session, SessionConfig};
use crate::ui::SessionReport;

const QUIT: &str = "quit";
const RECENT_WINDOW: usize = 5;
const MILESTONE_EVERY: usize = 5;
const TITLE: &str = "MATH QUEST - Adaptive Arithmetic Practice";

/// Settings after merging the config file with command-line flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeSettings {
    pub learner: Option<String>,
    pub starting_difficulty: Option<DifficultyLevel>,
    pub max_questions: Option<usize>,
    pub seed: Option<u64>,
    pub json: bool,
    pub chart: bool,
    pub color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Value { value: i64, secs: f64 },
    Quit,
}

/// Console front end: prompts, the question loop and the closing summary
pub struct App<S: LineSource, W: Write, T: ResponseTimer> {
    source: S,
    out: W,
    timer: T,
    color: bool,
}

impl<S: LineSource, W: Write, T: ResponseTimer> App<S, W, T> {
    pub fn new(source: S, out: W, timer: T, color: bool) -> Self {
        Self {
            source,
            out,
            timer,
            color,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Full interactive flow. Returns `None` if input ended before the first question.
    pub fn run(&mut self, settings: &RuntimeSettings) -> Result<Option<Session>> {
        self.welcome()?;

        let learner = match settings.learner.clone() {
            Some(name) => name,
            None => match self.prompt_name()? {
                Some(name) => name,
                None => return Ok(None),
            },
        };
        let starting_difficulty = match settings.starting_difficulty {
            Some(level) => level,
            None => match self.prompt_difficulty(&learner)? {
                Some(level) => level,
                None => return Ok(None),
            },
        };

        self.instructions(starting_difficulty)?;

        let mut session = Session::new(SessionConfig {
            learner,
            starting_difficulty,
            max_questions: settings.max_questions,
            seed: settings.seed,
        });
        self.play(&mut session)?;

        if settings.json {
            self.print_json(&session)?;
        } else {
            self.print_summary(&session)?;
        }
        Ok(Some(session))
    }

    fn welcome(&mut self) -> io::Result<()> {
        let rule = "=".repeat(TITLE.width());
        writeln!(self.out, "{rule}")?;
        self.say(Tone::Notice, TITLE)?;
        writeln!(self.out, "{rule}")
    }

    fn instructions(&mut self, level: DifficultyLevel) -> io::Result<()> {
        self.say(Tone::Good, &format!("Starting at {level} level!"))?;
        writeln!(self.out, "  - Answer each question with a whole number")?;
        writeln!(self.out, "  - Type '{QUIT}' anytime to end the session")?;
        writeln!(
            self.out,
            "  - Difficulty adapts every 3 questions, so aim for accuracy and speed"
        )
    }

    pub fn prompt_name(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(line) = self.read("Enter your name: ")? else {
                return Ok(None);
            };
            let name = line.trim();
            if !name.is_empty() {
                return Ok(Some(name.to_string()));
            }
            writeln!(self.out, "Please enter a name.")?;
        }
    }

    pub fn prompt_difficulty(&mut self, learner: &str) -> io::Result<Option<DifficultyLevel>> {
        writeln!(self.out, "\nHi {learner}! Choose your starting difficulty level:")?;
        for (idx, level) in DifficultyLevel::ALL.iter().enumerate() {
            writeln!(self.out, "  {}. {level}: {}", idx + 1, level.blurb())?;
        }
        loop {
            let Some(line) = self.read("Enter 1, 2, or 3: ")? else {
                return Ok(None);
            };
            if let Some(level) = DifficultyLevel::from_menu_choice(&line) {
                return Ok(Some(level));
            }
            debug!(input = %line, "invalid menu selection");
            writeln!(self.out, "Please choose from: 1, 2, 3")?;
        }
    }

    /// Ask one puzzle, reprompting on non-numeric input. End of input counts as quit.
    pub fn ask(&mut self, puzzle: &Puzzle) -> io::Result<Answer> {
        writeln!(self.out, "\n{puzzle} = ?")?;
        self.timer.start();
        loop {
            let Some(line) = self.read(&format!("Your answer (or '{QUIT}'): "))? else {
                return Ok(Answer::Quit);
            };
            let input = line.trim();
            if input.eq_ignore_ascii_case(QUIT) {
                return Ok(Answer::Quit);
            }
            match input.parse::<i64>() {
                Ok(value) => {
                    return Ok(Answer::Value {
                        value,
                        secs: self.timer.elapsed_secs(),
                    })
                }
                Err(_) => {
                    debug!(input, "non-numeric answer");
                    self.say(Tone::Bad, "Please enter a number!")?;
                }
            }
        }
    }

    pub fn play(&mut self, session: &mut Session) -> io::Result<()> {
        while !session.is_finished() {
            let question = session.tracker().len() + 1;
            writeln!(self.out, "\n{}", "-".repeat(50))?;
            writeln!(
                self.out,
                "Question {question} | Difficulty: {}",
                session.difficulty()
            )?;
            if question > 1 {
                let hint = feedback::progress_hint(question, session.questions_until_check());
                writeln!(self.out, "{hint}")?;
            }

            let puzzle = session.next_puzzle();
            let (value, secs) = match self.ask(&puzzle)? {
                Answer::Quit => {
                    self.say(Tone::Notice, "\nThanks for practicing!")?;
                    break;
                }
                Answer::Value { value, secs } => (value, secs),
            };

            let outcome = session.submit(&puzzle, value, secs);
            for message in feedback::answer_feedback(&outcome.record) {
                self.emit(&message)?;
            }

            let answered = session.tracker().len();
            let recent = session.tracker().window_stats(RECENT_WINDOW);
            if answered >= 3 {
                if let Some(stats) = recent {
                    writeln!(
                        self.out,
                        "   Recent accuracy: {:.0}% (last {} questions)",
                        stats.accuracy * 100.0,
                        stats.count
                    )?;
                }
            }

            if let Some(adaptation) = outcome.adaptation {
                if let Some(text) = feedback::adaptation_message(&adaptation) {
                    writeln!(self.out)?;
                    self.say(Tone::Notice, &text)?;
                }
                if let Some(stats) = recent {
                    let text = feedback::encouragement(&stats, session.tracker().current_streak());
                    writeln!(self.out, "   {text}")?;
                }
            }

            if answered % MILESTONE_EVERY == 0 {
                if let Some(summary) = session.summary() {
                    self.say(
                        Tone::Notice,
                        &format!(
                            "Milestone: {answered} questions completed! Overall accuracy: {:.1}%",
                            summary.accuracy_percentage
                        ),
                    )?;
                    if let Some(note) = feedback::milestone_note(&summary.learning_velocity) {
                        writeln!(self.out, "   {note}")?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn print_summary(&mut self, session: &Session) -> io::Result<()> {
        match SessionReport::from_session(session) {
            Some(report) => {
                for line in report.lines() {
                    writeln!(self.out, "{line}")?;
                }
            }
            None => writeln!(self.out, "No questions answered. See you next time!")?,
        }
        self.out.flush()
    }

    pub fn print_json(&mut self, session: &Session) -> Result<()> {
        let json = match SessionReport::from_session(session) {
            Some(report) => serde_json::to_string_pretty(&report)?,
            None => "null".to_string(),
        };
        writeln!(self.out, "{json}")?;
        self.out.flush()?;
        Ok(())
    }

    fn read(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        self.source.next_line()
    }

    fn emit(&mut self, message: &Message) -> io::Result<()> {
        self.say(message.tone, &message.text)
    }

    fn say(&mut self, tone: Tone, text: &str) -> io::Result<()> {
        if !self.color {
            return writeln!(self.out, "{text}");
        }
        match tone {
            Tone::Plain => writeln!(self.out, "{text}"),
            Tone::Good => writeln!(self.out, "{}", style(text).green().bold()),
            Tone::Bad => writeln!(self.out, "{}", style(text).red().bold()),
            Tone::Notice => writeln!(self.out, "{}", style(text).cyan()),
        }
    }
}
