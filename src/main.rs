use clap::Parser;
use crossterm::tty::IsTty;
use mathquest::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{StdinLines, WallClockTimer},
    ui::{SessionReport, CHART_HEIGHT},
    App, DifficultyLevel, RuntimeSettings,
};
use ratatui::{backend::CrosstermBackend, Terminal, TerminalOptions, Viewport};
use std::{error::Error, io};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// adaptive arithmetic practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Arithmetic practice that adapts to you: every three answers the difficulty is re-evaluated from your accuracy and response time."
)]
pub struct Cli {
    /// learner name, skips the name prompt
    #[clap(long)]
    name: Option<String>,

    /// starting difficulty, skips the menu
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyLevel>,

    /// stop after this many answered questions
    #[clap(short = 'n', long = "questions")]
    max_questions: Option<usize>,

    /// seed the puzzle generator for a reproducible question sequence
    #[clap(long)]
    seed: Option<u64>,

    /// print the end-of-session summary as JSON
    #[clap(long)]
    json: bool,

    /// do not draw the response time chart
    #[clap(long)]
    no_chart: bool,

    /// disable colored output
    #[clap(long)]
    no_color: bool,

    /// remember name, difficulty, question limit and display flags as defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over the config file
    fn to_runtime_settings(&self, cfg: &Config) -> RuntimeSettings {
        RuntimeSettings {
            learner: self.name.clone().or_else(|| cfg.learner_name.clone()),
            starting_difficulty: self.difficulty.or(cfg.starting_difficulty),
            max_questions: self.max_questions.or(cfg.max_questions),
            seed: self.seed,
            json: self.json,
            chart: cfg.chart && !self.no_chart,
            color: cfg.color && !self.no_color,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Draw the response chart below the summary without taking over the screen
fn draw_chart(report: &SessionReport) -> io::Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(CHART_HEIGHT),
        },
    )?;
    terminal.draw(|f| f.render_widget(report, f.area()))?;
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let store = FileConfigStore::default();
    let mut settings = cli.to_runtime_settings(&store.load());
    if cli.save_config {
        store.save(&Config::from(&settings))?;
        info!(path = %store.path().display(), "config saved");
    }

    let interactive = io::stdout().is_tty();
    settings.color &= interactive;
    settings.chart &= interactive && !settings.json;

    let mut app = App::new(
        StdinLines::new(),
        io::stdout(),
        WallClockTimer::default(),
        settings.color,
    );
    let session = app.run(&settings)?;

    if settings.chart {
        if let Some(report) = session.as_ref().and_then(SessionReport::from_session) {
            draw_chart(&report)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mathquest").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.name.is_none());
        assert!(cli.difficulty.is_none());
        assert!(!cli.json);
        let settings = cli.to_runtime_settings(&Config::default());
        assert!(settings.chart);
        assert!(settings.color);
        assert_eq!(settings.learner, None);
    }

    #[test]
    fn test_flags_parse() {
        let cli = parse(&[
            "--name",
            "Ada",
            "-d",
            "medium",
            "-n",
            "9",
            "--seed",
            "5",
            "--json",
            "--no-chart",
            "--no-color",
        ]);
        let settings = cli.to_runtime_settings(&Config::default());
        assert_eq!(settings.learner.as_deref(), Some("Ada"));
        assert_eq!(settings.starting_difficulty, Some(DifficultyLevel::Medium));
        assert_eq!(settings.max_questions, Some(9));
        assert_eq!(settings.seed, Some(5));
        assert!(settings.json);
        assert!(!settings.chart);
        assert!(!settings.color);
    }

    #[test]
    fn test_invalid_difficulty_rejected() {
        assert!(Cli::try_parse_from(["mathquest", "-d", "extreme"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = Config {
            learner_name: Some("Grace".into()),
            starting_difficulty: Some(DifficultyLevel::Hard),
            max_questions: Some(30),
            chart: false,
            color: true,
        };
        let settings = parse(&["--name", "Ada"]).to_runtime_settings(&cfg);
        assert_eq!(settings.learner.as_deref(), Some("Ada"));
        assert_eq!(settings.starting_difficulty, Some(DifficultyLevel::Hard));
        assert_eq!(settings.max_questions, Some(30));
        assert!(!settings.chart);
        assert!(settings.color);
    }
}
