//! git::interface
//!
//! The revision-control seam used by the changelog engine.
//!
//! The engine only needs a handful of operations: resolve a revision,
//! check a view out at that revision, list and read files in the view, and
//! walk the commits that touched a path. [`RevisionControl`] captures
//! exactly that surface so the engine can run against the real repository
//! ([`crate::git::Git`]) or an in-memory double ([`crate::git::mock::MockRepo`]).
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RevisionNotFound`]: A revision could not be resolved
//! - [`GitError::NoCheckout`]: A read was attempted before any checkout
//! - [`GitError::NotADirectory`] / [`GitError::FileNotFound`]: Path problems
//!   inside the checked-out view

use std::io::Read;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{Oid, TypeError};

/// Errors from revision-control operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// A revision could not be resolved to a commit.
    #[error("cannot resolve revision '{revision}': {message}")]
    RevisionNotFound {
        /// The revision as given by the caller
        revision: String,
        /// Why resolution failed
        message: String,
    },

    /// A read was attempted before any revision was checked out.
    #[error("no revision checked out")]
    NoCheckout,

    /// The path exists in the checked-out tree but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path
        path: String,
    },

    /// The path does not name a file in the checked-out tree.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path
        path: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Wrap a git2 error, prefixing the message with what was being done.
    pub(crate) fn internal(context: &str, err: git2::Error) -> Self {
        GitError::Internal {
            message: format!("{}: {}", context, err.message()),
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            other => GitError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file (or symlink) content
    File,
    /// Subdirectory
    Directory,
    /// Anything else, e.g. a submodule
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name, without the directory
    pub name: String,
    /// What the entry is
    pub kind: FileKind,
}

impl FileInfo {
    /// Create a listing entry for a file.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::File,
        }
    }

    /// Create a listing entry for a directory.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Directory,
        }
    }

    /// Whether this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// Commits that touched a path, most recent first.
pub type CommitHistory<'a> = Box<dyn Iterator<Item = Result<CommitInfo, GitError>> + 'a>;

/// Revision-control operations consumed by the changelog engine.
///
/// Paths are repository-root relative and use `/` separators. All reads
/// (`list_directory`, `open_file`, `commit_history`) observe the revision
/// selected by the last `checkout_worktree` call.
pub trait RevisionControl {
    /// Resolve a symbolic revision (tag, branch, abbreviated SHA, ...) to
    /// the commit it names.
    fn resolve_revision(&self, revision: &str) -> Result<Oid, GitError>;

    /// Select the revision that subsequent reads observe.
    ///
    /// This replaces whatever view was previously checked out.
    fn checkout_worktree(&mut self, revision: &Oid) -> Result<(), GitError>;

    /// List the entries directly inside `path`.
    ///
    /// A directory that does not exist at the checked-out revision lists as
    /// empty; git has no notion of an empty directory.
    fn list_directory(&self, path: &str) -> Result<Vec<FileInfo>, GitError>;

    /// Open a file for reading.
    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, GitError>;

    /// Commits reachable from the checked-out revision that touched `path`,
    /// most recent first.
    fn commit_history(&self, path: &str) -> Result<CommitHistory<'_>, GitError>;
}

/// Join a directory and a file name into a repository path.
///
/// # Example
///
/// ```
/// use changelog_build::git::join_path;
///
/// assert_eq!(join_path(".changelog", "12.txt"), ".changelog/12.txt");
/// assert_eq!(join_path(".changelog/", "12.txt"), ".changelog/12.txt");
/// assert_eq!(join_path("", "12.txt"), "12.txt");
/// ```
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = normalize_path(dir);
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Strip leading `./` and surrounding slashes from a repository path.
pub fn normalize_path(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.trim_matches('/');
    if path == "." {
        ""
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn revision_not_found_names_revision() {
            let err = GitError::RevisionNotFound {
                revision: "v9.9.9".to_string(),
                message: "reference not found".to_string(),
            };
            assert!(err.to_string().contains("v9.9.9"));
        }

        #[test]
        fn path_errors_name_path() {
            let err = GitError::NotADirectory {
                path: ".changelog".to_string(),
            };
            assert!(err.to_string().contains(".changelog"));

            let err = GitError::FileNotFound {
                path: ".changelog/1.txt".to_string(),
            };
            assert!(err.to_string().contains(".changelog/1.txt"));
        }

        #[test]
        fn from_type_error() {
            let err: GitError = TypeError::InvalidOid("bad".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn normalize_strips_noise() {
            assert_eq!(normalize_path("./.changelog/"), ".changelog");
            assert_eq!(normalize_path("/docs/entries"), "docs/entries");
            assert_eq!(normalize_path("."), "");
            assert_eq!(normalize_path(""), "");
        }

        #[test]
        fn join_nested() {
            assert_eq!(join_path("docs/entries", "a.txt"), "docs/entries/a.txt");
            assert_eq!(join_path(".", "a.txt"), "a.txt");
        }
    }

    mod file_info {
        use super::*;

        #[test]
        fn constructors_set_kind() {
            assert!(FileInfo::file("a.txt").is_file());
            assert!(!FileInfo::directory("nested").is_file());
        }
    }
}
