//! render
//!
//! Turns aggregated changelog data into output text.
//!
//! # Design
//!
//! Rendering is pure: a [`Changelog`] and [`RenderOptions`] go in, a
//! string comes out. Nothing here touches the repository or the network.
//!
//! # Formats
//!
//! - [`OutputFormat::Markdown`]: one section per note type (see [`markdown`])
//! - [`OutputFormat::Json`]: the [`Changelog`] itself, pretty-printed

pub mod markdown;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Changelog;

/// Errors from rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize changelog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Sectioned Markdown
    #[default]
    Markdown,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Name used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Settings for Markdown output.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Per-note line template; see [`markdown::format_note`]
    pub note_format: String,
    /// Types rendered first, in this order
    pub section_order: Vec<String>,
    /// Heading overrides by type
    pub headings: BTreeMap<String, String>,
    /// `owner/name`, substituted for `{repo}`
    pub repo: Option<String>,
}

/// Render `changelog` in `format`.
///
/// # Example
///
/// ```
/// use changelog_build::core::types::Entry;
/// use changelog_build::engine::build_changelog;
/// use changelog_build::render::{render, OutputFormat, RenderOptions};
///
/// let changelog = build_changelog(&[Entry::new("12", "[bug] Fixed a crash")]);
/// let options = RenderOptions {
///     note_format: "* {body} (#{issue})".to_string(),
///     ..Default::default()
/// };
///
/// let text = render(&changelog, OutputFormat::Markdown, &options).unwrap();
/// assert_eq!(text, "BUG\n\n* Fixed a crash (#12)\n");
/// ```
pub fn render(
    changelog: &Changelog,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Markdown => Ok(markdown::render_markdown(changelog, options)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(changelog)?),
    }
}
