//! cli
//!
//! Command-line interface layer for changelog-build.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Set up diagnostics for the requested verbosity
//! - Delegate to the build command and write its output
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands off to
//! [`commands::build`], which wires the repository, configuration, and
//! [`crate::engine`] together.

pub mod args;
pub mod commands;

pub use args::Cli;

use crate::ui::output::{self, Verbosity};
use anyhow::{Context, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    output::init_logging(verbosity);

    let text = commands::build(&cli, verbosity)?;
    output::document(&text).context("failed to write output")
}
