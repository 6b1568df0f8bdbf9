//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! The rendered changelog is the only thing written to stdout, so it can
//! be piped or redirected. Everything else (warnings, progress, debug
//! detail) goes to stderr and respects the verbosity flags.

use std::fmt::Display;
use std::io::{self, Write};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Maximum level for engine diagnostics at this verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self {
            Verbosity::Quiet => tracing::Level::ERROR,
            Verbosity::Normal => tracing::Level::WARN,
            Verbosity::Debug => tracing::Level::DEBUG,
        }
    }
}

/// Install the stderr diagnostics subscriber for `verbosity`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(verbosity.log_level())
        .with_target(false)
        .try_init();
}

/// Write the rendered document to stdout.
///
/// Always written, even in quiet mode; it is the command's result.
pub fn document(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

/// Print a status message to stderr (respects quiet mode).
pub fn info(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn log_levels() {
        assert_eq!(Verbosity::Debug.log_level(), tracing::Level::DEBUG);
        assert_eq!(Verbosity::Normal.log_level(), tracing::Level::WARN);
        assert_eq!(Verbosity::Quiet.log_level(), tracing::Level::ERROR);
    }
}
