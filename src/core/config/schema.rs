//! core::config::schema
//!
//! Configuration schema types.
//!
//! The global and repo files share one schema; any key may appear in
//! either. Repo values override global ones key by key, and the
//! `[render.headings]` table is merged per type.
//!
//! # Validation
//!
//! Enumerated values (`filename_format`, `render.format`) are checked while
//! parsing. Free-form values are checked by [`ConfigFile::validate`] after
//! parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::FilenameFormat;
use crate::forge::RepoSlug;
use crate::render::OutputFormat;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// entries_dir = ".changelog"
/// filename_format = "pr-number"
/// repo = "hashicorp/consul"
///
/// [render]
/// format = "markdown"
/// note_format = "* {body} ([GH-{issue}](https://github.com/{repo}/issues/{issue}))"
/// section_order = ["breaking-change", "feature", "improvement", "bug"]
///
/// [render.headings]
/// bug = "BUG FIXES"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding one file per changelog entry
    pub entries_dir: Option<String>,

    /// How entry identifiers are derived
    pub filename_format: Option<FilenameFormat>,

    /// Repository slug used for pull request lookups
    pub repo: Option<String>,

    /// GitHub GraphQL endpoint
    pub api_url: Option<String>,

    /// Output settings
    pub render: Option<RenderConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.entries_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "entries_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(repo) = &self.repo {
            RepoSlug::parse(repo)
                .map_err(|e| ConfigError::InvalidValue(format!("invalid repo: {}", e)))?;
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        if let Some(render) = &self.render {
            render.validate()?;
        }

        Ok(())
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output format
    pub format: Option<OutputFormat>,

    /// Per-note line template
    pub note_format: Option<String>,

    /// Types rendered first, in this order
    pub section_order: Option<Vec<String>>,

    /// Section heading by type
    pub headings: BTreeMap<String, String>,
}

impl RenderConfig {
    /// Validate the render settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(note_format) = &self.note_format {
            if !note_format.contains("{body}") {
                return Err(ConfigError::InvalidValue(format!(
                    "note_format must contain {{body}}, got '{}'",
                    note_format
                )));
            }
        }

        if let Some(order) = &self.section_order {
            if order.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "section_order cannot contain empty types".to_string(),
                ));
            }
        }

        Ok(())
    }
}
