//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`Entry`] - A changelog entry file resolved to an issue identifier
//! - [`Note`] - One typed line extracted from an entry
//! - [`FilenameFormat`] - How entry identifiers are derived
//!
//! # Examples
//!
//! ```
//! use changelog_build::core::types::{Entry, Oid};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(7), "abc123d");
//!
//! let entry = Entry::new("1234", "```release-note:bug\nFixed a crash\n```\n");
//! assert_eq!(entry.issue, "1234");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("unknown filename format '{0}', must be one of: pr-number, timestamp")]
    UnknownFilenameFormat(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use changelog_build::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, or the full OID if shorter.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the OID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One changelog entry file, resolved to an issue identifier.
///
/// `body` holds the raw file contents. Entries are created by the differ
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Issue or pull request identifier
    pub issue: String,
    /// Raw entry file contents
    pub body: String,
}

impl Entry {
    /// Create an entry.
    pub fn new(issue: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            body: body.into(),
        }
    }
}

/// One typed changelog line extracted from an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note category, e.g. `bug` or `breaking-change`
    #[serde(rename = "type")]
    pub note_type: String,
    /// Note text
    pub body: String,
    /// Identifier inherited from the entry
    pub issue: String,
    /// Source order of the note within its entry
    pub position: usize,
}

/// How the differ derives an entry's issue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameFormat {
    /// Entry files are named after the PR number, e.g. `1234.txt`.
    #[default]
    PrNumber,
    /// Entry files have arbitrary names; the PR is found from the
    /// commit that introduced the file.
    Timestamp,
}

impl FilenameFormat {
    /// Name used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            FilenameFormat::PrNumber => "pr-number",
            FilenameFormat::Timestamp => "timestamp",
        }
    }

    /// Parse a format name.
    ///
    /// # Example
    ///
    /// ```
    /// use changelog_build::core::types::FilenameFormat;
    ///
    /// assert_eq!(FilenameFormat::parse("timestamp").unwrap(), FilenameFormat::Timestamp);
    /// assert!(FilenameFormat::parse("uuid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s {
            "pr-number" => Ok(FilenameFormat::PrNumber),
            "timestamp" => Ok(FilenameFormat::Timestamp),
            other => Err(TypeError::UnknownFilenameFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for FilenameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for FilenameFormat {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
