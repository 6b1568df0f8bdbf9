//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! changelog-build has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! 1. The path passed explicitly (`--config`), which must exist
//! 2. `$CHANGELOG_BUILD_CONFIG` if set
//! 3. `<config dir>/changelog-build/config.toml`
//!
//! # Repo Config Location
//!
//! `.changelog-build.toml` at the repository root.
//!
//! # Example
//!
//! ```no_run
//! use changelog_build::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo")), None).unwrap();
//! let config = result.config;
//!
//! println!("Entries: {}", config.entries_dir());
//! println!("Format: {}", config.filename_format());
//! ```

pub mod schema;

pub use schema::{ConfigFile, RenderConfig};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::FilenameFormat;
use crate::forge::github::DEFAULT_GRAPHQL_URL;
use crate::render::OutputFormat;

/// Environment variable naming the global config file.
pub const CONFIG_ENV: &str = "CHANGELOG_BUILD_CONFIG";

/// Name of the repo config file, relative to the repository root.
pub const REPO_CONFIG_FILE: &str = ".changelog-build.toml";

/// Entries directory used when none is configured.
pub const DEFAULT_ENTRIES_DIR: &str = ".changelog";

/// Note template used when none is configured.
pub const DEFAULT_NOTE_FORMAT: &str = "* {body} (#{issue})";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value in '{path}': {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: repo config overrides global
/// config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if present)
    pub repo: Option<ConfigFile>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// `explicit` overrides the global config search and must exist. If
    /// `repo_root` is provided, the repo config file is loaded from it too.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. Missing default-location files are not an error.
    pub fn load(
        repo_root: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = match explicit {
            Some(path) => (Self::read_config(path)?, Some(path.to_path_buf())),
            None => Self::load_global(&mut warnings)?,
        };

        let (repo, repo_path) = match repo_root {
            Some(root) => Self::load_repo(root)?,
            None => (None, None),
        };

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path,
            },
            warnings,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global(
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(ConfigFile, Option<PathBuf>), ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
            warnings.push(ConfigWarning {
                message: format!("{} points to a missing file, ignoring it", CONFIG_ENV),
                path,
            });
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((ConfigFile::default(), None))
    }

    /// Load repository configuration from the repository root.
    fn load_repo(repo_root: &Path) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let path = Self::repo_config_path(repo_root);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_config(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Read, parse, and validate a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate().map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: match e {
                ConfigError::InvalidValue(message) => message,
                other => other.to_string(),
            },
        })?;

        Ok(config)
    }

    /// Default location of the global config file.
    ///
    /// Returns `<config dir>/changelog-build/config.toml`, or `None` when
    /// the platform has no config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("changelog-build").join("config.toml"))
    }

    /// Location of the repo config file under `repo_root`.
    pub fn repo_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(REPO_CONFIG_FILE)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Pick the first value set in the repo file, then the global file.
    fn pick<'a, T: ?Sized>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<&'a T>) -> Option<&'a T> {
        self.repo.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    fn pick_render<'a, T: ?Sized>(
        &'a self,
        get: impl Fn(&'a RenderConfig) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.pick(|c| c.render.as_ref().and_then(&get))
    }

    /// Get the entries directory.
    ///
    /// Defaults to `.changelog` if not configured.
    pub fn entries_dir(&self) -> &str {
        self.pick(|c| c.entries_dir.as_deref())
            .unwrap_or(DEFAULT_ENTRIES_DIR)
    }

    /// Get the filename format.
    ///
    /// Defaults to `pr-number` if not configured.
    pub fn filename_format(&self) -> FilenameFormat {
        self.pick(|c| c.filename_format.as_ref())
            .copied()
            .unwrap_or_default()
    }

    /// Get the repository slug.
    ///
    /// Returns `None` if not configured.
    pub fn repo(&self) -> Option<&str> {
        self.pick(|c| c.repo.as_deref())
    }

    /// Get the GitHub GraphQL endpoint.
    ///
    /// Defaults to the public GitHub API if not configured.
    pub fn api_url(&self) -> &str {
        self.pick(|c| c.api_url.as_deref())
            .unwrap_or(DEFAULT_GRAPHQL_URL)
    }

    /// Get the output format.
    ///
    /// Defaults to Markdown if not configured.
    pub fn output_format(&self) -> OutputFormat {
        self.pick_render(|r| r.format.as_ref())
            .copied()
            .unwrap_or_default()
    }

    /// Get the per-note template.
    pub fn note_format(&self) -> &str {
        self.pick_render(|r| r.note_format.as_deref())
            .unwrap_or(DEFAULT_NOTE_FORMAT)
    }

    /// Get the types rendered first.
    ///
    /// Empty if not configured.
    pub fn section_order(&self) -> &[String] {
        self.pick_render(|r| r.section_order.as_deref())
            .unwrap_or(&[])
    }

    /// Get section headings, global entries overridden per type by repo
    /// entries.
    pub fn headings(&self) -> BTreeMap<String, String> {
        let mut headings = BTreeMap::new();
        for file in std::iter::once(&self.global).chain(self.repo.as_ref()) {
            if let Some(render) = &file.render {
                headings.extend(
                    render
                        .headings
                        .iter()
                        .map(|(k, v)| (k.to_lowercase(), v.clone())),
                );
            }
        }
        headings
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
