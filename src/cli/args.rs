//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Flags left unset fall back to the configuration files, then to
//! built-in defaults. Only the two revisions are always required.

use clap::Parser;
use std::path::PathBuf;

use crate::core::types::FilenameFormat;
use crate::render::OutputFormat;

/// Build release notes from changelog entry files added between two revisions
#[derive(Parser, Debug)]
#[command(name = "changelog-build")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Notes for v1.1.0, entries named after PR numbers
    changelog-build --last-release v1.0.0 --this-release v1.1.0

    # First release: every entry counts
    changelog-build --last-release - --this-release v0.1.0

    # Entries with arbitrary names; look up each file's pull request
    GITHUB_TOKEN=... changelog-build --last-release v1.0.0 --this-release HEAD \\
        --filename-format timestamp --repo hashicorp/consul")]
pub struct Cli {
    /// Revision of the previous release, or '-' if there is none
    #[arg(long, value_name = "REV", allow_hyphen_values = true)]
    pub last_release: String,

    /// Revision of the release being built
    #[arg(long, value_name = "REV")]
    pub this_release: String,

    /// Repository to read (any directory inside it)
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub git_dir: PathBuf,

    /// Directory holding the entry files, relative to the repository root
    #[arg(long, value_name = "PATH")]
    pub entries_dir: Option<String>,

    /// How entry files map to pull requests
    #[arg(long, value_enum)]
    pub filename_format: Option<FilenameFormatArg>,

    /// Repository on GitHub as owner/name (commit lookups only)
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Template for each note: {body}, {issue}, {type}, {repo}
    #[arg(long, value_name = "FMT")]
    pub note_format: Option<String>,

    /// Read global configuration from this file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only print the changelog and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Filename formats
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameFormatArg {
    /// Files are named after the pull request, e.g. 1234.txt
    PrNumber,
    /// Files have arbitrary names; the pull request is looked up
    Timestamp,
}

impl From<FilenameFormatArg> for FilenameFormat {
    fn from(arg: FilenameFormatArg) -> Self {
        match arg {
            FilenameFormatArg::PrNumber => FilenameFormat::PrNumber,
            FilenameFormatArg::Timestamp => FilenameFormat::Timestamp,
        }
    }
}

/// Output formats
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Sectioned Markdown
    Markdown,
    /// Pretty-printed JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("changelog-build").chain(args.iter().copied()))
    }

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn revisions_are_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--last-release", "v1"]).is_err());
        assert!(parse(&["--this-release", "v2"]).is_err());
    }

    #[test]
    fn dash_means_no_previous_release() {
        let cli = parse(&["--last-release", "-", "--this-release", "v1"]).unwrap();
        assert_eq!(cli.last_release, "-");
        assert_eq!(cli.git_dir, PathBuf::from("."));
        assert!(cli.filename_format.is_none());
    }

    #[test]
    fn value_enums() {
        let cli = parse(&[
            "--last-release",
            "v1",
            "--this-release",
            "v2",
            "--filename-format",
            "timestamp",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(
            cli.filename_format.map(FilenameFormat::from),
            Some(FilenameFormat::Timestamp)
        );
        assert_eq!(cli.format.map(OutputFormat::from), Some(OutputFormat::Json));
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(parse(&[
            "--last-release",
            "v1",
            "--this-release",
            "v2",
            "--filename-format",
            "uuid",
        ])
        .is_err());
    }
}
