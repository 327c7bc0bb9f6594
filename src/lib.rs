// Library surface for the binary and for headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod puzzle;
pub mod runtime;
pub mod session;
pub mod tracker;
pub mod ui;
pub mod util;

pub use app::{App, RuntimeSettings};
pub use difficulty::DifficultyLevel;
pub use error::{Error, Result};
