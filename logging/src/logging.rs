use crate::raise_error::{raise_error, Level};

/// Console logger for the command line tool.
///
/// Messages below `level` are dropped, and nothing but failures is
/// printed unless `verbose` is set. Failures always go through
/// [`raise_error`] and end the process.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    level: Level,
    verbose: bool,
}

impl Logger {
    pub fn new(verbose: bool, level: Level) -> Logger {
        Logger { level, verbose }
    }

    /// Whether a message at `level` would be printed.
    pub fn enabled(&self, level: Level) -> bool {
        self.verbose && level >= self.level
    }

    pub fn log(&self, message: &str, level: Level) {
        if level.is_failure() {
            raise_error(message, level);
        } else if self.enabled(level) {
            println!("{}", level.apply(message));
        }
    }

    pub fn info(&self, message: &str) {
        self.log(message, Level::Info);
    }

    pub fn completed(&self, message: &str) {
        self.log(message, Level::Completion);
    }

    /// Warnings are shown even when the logger is not verbose.
    pub fn warn(&self, message: &str) {
        if self.level <= Level::Warning {
            eprintln!("{}", Level::Warning.apply(message));
        }
    }
}
