use colored::*;
use std::process::exit;

/// Severity of a console message, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Completion = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    /// Maps a `--debug-level` value onto a level; anything outside 1..=5 is rejected.
    pub fn from_i32(level: i32) -> Option<Level> {
        match level {
            1 => Some(Level::Completion),
            2 => Some(Level::Info),
            3 => Some(Level::Warning),
            4 => Some(Level::Error),
            5 => Some(Level::Fatal),
            _ => None,
        }
    }

    pub(crate) fn apply(&self, message: &str) -> ColoredString {
        match self {
            Level::Completion => format!("completed: {message}").bright_green(),
            Level::Info => format!("info: {message}").bright_cyan(),
            Level::Warning => format!("warning: {message}").bright_yellow(),
            Level::Error => format!("error: {message}").bright_red(),
            Level::Fatal => format!("fatal error: {message}").red().bold(),
        }
    }

    pub(crate) fn is_failure(&self) -> bool {
        *self >= Level::Error
    }
}

/// Prints an error to stderr and exits the program if the level is an error.
///
/// # Arguments
///
/// * `error` - The error message
/// * `level` - The severity; `Error` and `Fatal` terminate with status 1
pub fn raise_error(error: &str, level: Level) {
    eprintln!("{}", level.apply(error));
    if level.is_failure() {
        exit(1);
    }
}
