use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::time::Instant;

/// Source of learner input, one line at a time
pub trait LineSource {
    /// Returns `Ok(None)` once input is exhausted.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Production source reading standard input
pub struct StdinLines {
    stdin: io::Stdin,
}

impl StdinLines {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinLines {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
        }
    }
}

/// Test source replaying canned lines
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedLines {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Measures how long the learner takes to answer
pub trait ResponseTimer {
    fn start(&mut self);
    /// Seconds since the last `start`
    fn elapsed_secs(&self) -> f64;
}

/// Wall-clock timer
#[derive(Debug, Default)]
pub struct WallClockTimer {
    started_at: Option<Instant>,
}

impl ResponseTimer for WallClockTimer {
    fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> f64 {
        self.started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Timer reporting a fixed response time, for tests
#[derive(Clone, Copy, Debug)]
pub struct FixedTimer {
    secs: f64,
}

impl FixedTimer {
    pub fn new(secs: f64) -> Self {
        Self { secs }
    }
}

impl ResponseTimer for FixedTimer {
    fn start(&mut self) {}

    fn elapsed_secs(&self) -> f64 {
        self.secs
    }
}
