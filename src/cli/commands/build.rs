//! cli::commands::build
//!
//! Build the changelog for a release.
//!
//! # Design
//!
//! 1. Open the repository and load configuration from it
//! 2. Merge flags over configuration into [`Settings`]
//! 3. Diff the two revisions, looking up pull requests on GitHub when
//!    entries are not named after them
//! 4. Parse, aggregate, and render the notes
//!
//! # Example
//!
//! ```bash
//! changelog-build --last-release v1.0.0 --this-release v1.1.0 --format json
//! ```

use anyhow::{anyhow, bail, Context, Result};

use crate::cli::args::Cli;
use crate::core::config::Config;
use crate::core::types::FilenameFormat;
use crate::engine;
use crate::forge::github::{parse_github_url, GitHubResolver};
use crate::forge::RepoSlug;
use crate::git::Git;
use crate::render::{self, OutputFormat, RenderOptions};
use crate::ui::output::{self, Verbosity};

/// Environment variable holding the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Effective settings after merging flags, config, and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub entries_dir: String,
    pub filename_format: FilenameFormat,
    pub repo: Option<RepoSlug>,
    pub api_url: String,
    pub format: OutputFormat,
    pub render: RenderOptions,
}

/// Run the build and return the rendered changelog.
pub fn build(cli: &Cli, verbosity: Verbosity) -> Result<String> {
    let mut git = Git::open(&cli.git_dir)
        .with_context(|| format!("failed to open repository at '{}'", cli.git_dir.display()))?;

    let loaded = Config::load(Some(git.root()), cli.config.as_deref())
        .context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    let config = loaded.config;
    if let Some(path) = config.global_config_loaded_from() {
        output::debug(format!("global config: {}", path.display()), verbosity);
    }
    if let Some(path) = config.repo_config_loaded_from() {
        output::debug(format!("repo config: {}", path.display()), verbosity);
    }

    let settings = resolve_settings(cli, &config, detect_repo(&git))?;
    output::debug(
        format!(
            "entries in '{}', filename format {}",
            settings.entries_dir, settings.filename_format
        ),
        verbosity,
    );

    let entries = match settings.filename_format {
        FilenameFormat::PrNumber => engine::diff(
            &mut git,
            &cli.last_release,
            &cli.this_release,
            &settings.entries_dir,
        )?,
        FilenameFormat::Timestamp => {
            let repo = settings.repo.as_ref().ok_or_else(|| {
                anyhow!(
                    "--repo is required with --filename-format timestamp \
                     (could not determine it from the repository's remotes)"
                )
            })?;
            let resolver =
                GitHubResolver::with_graphql_url(github_token()?, settings.api_url.clone());

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(engine::diff_with_issue_resolution(
                &mut git,
                &cli.last_release,
                &cli.this_release,
                &settings.entries_dir,
                &repo.owner,
                &repo.name,
                &resolver,
            ))?
        }
    };
    let changelog = engine::build_changelog(&entries);
    output::info(
        format!(
            "{} new entries, {} notes in {} sections",
            entries.len(),
            changelog.notes.len(),
            changelog.notes_by_type.len()
        ),
        verbosity,
    );

    Ok(render::render(&changelog, settings.format, &settings.render)?)
}

/// Merge flags over configuration.
///
/// The repository slug comes from `--repo`, then config, then `detected`.
pub fn resolve_settings(
    cli: &Cli,
    config: &Config,
    detected: Option<RepoSlug>,
) -> Result<Settings> {
    let repo = match (&cli.repo, config.repo()) {
        (Some(flag), _) => {
            Some(RepoSlug::parse(flag).with_context(|| format!("invalid --repo '{}'", flag))?)
        }
        (None, Some(configured)) => Some(RepoSlug::parse(configured)?),
        (None, None) => detected,
    };

    let note_format = cli
        .note_format
        .clone()
        .unwrap_or_else(|| config.note_format().to_string());
    if !note_format.contains("{body}") {
        bail!("--note-format must contain {{body}}, got '{}'", note_format);
    }

    Ok(Settings {
        entries_dir: cli
            .entries_dir
            .clone()
            .unwrap_or_else(|| config.entries_dir().to_string()),
        filename_format: cli
            .filename_format
            .map(FilenameFormat::from)
            .unwrap_or_else(|| config.filename_format()),
        api_url: config.api_url().to_string(),
        format: cli
            .format
            .map(OutputFormat::from)
            .unwrap_or_else(|| config.output_format()),
        render: RenderOptions {
            note_format,
            section_order: config.section_order().to_vec(),
            headings: config.headings(),
            repo: repo.as_ref().map(|r| r.to_string()),
        },
        repo,
    })
}

/// Repository slug from the default remote, if it points at GitHub.
fn detect_repo(git: &Git) -> Option<RepoSlug> {
    let remote = git.default_remote().ok().flatten()?;
    let url = git.remote_url(&remote).ok().flatten()?;
    let Some((owner, name)) = parse_github_url(&url) else {
        tracing::debug!(remote = %remote, url = %url, "remote is not a GitHub repository");
        return None;
    };
    Some(RepoSlug { owner, name })
}

/// Read the GitHub token from the environment.
fn github_token() -> Result<String> {
    match std::env::var(GITHUB_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => bail!(
            "{} must be set when --filename-format is timestamp",
            GITHUB_TOKEN_ENV
        ),
    }
}
