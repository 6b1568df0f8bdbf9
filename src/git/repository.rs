//! git::repository
//!
//! [`RevisionControl`] implementation backed by git2.
//!
//! # Design
//!
//! A "checkout" here never touches the user's working directory. The
//! checked-out revision is remembered and every read goes straight to that
//! commit's tree in the object database. This keeps the caller's worktree
//! intact, lets two revisions be inspected back to back without cloning,
//! and works for bare repositories too.
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::git::{Git, RevisionControl};
//! use std::path::Path;
//!
//! let mut git = Git::open(Path::new("."))?;
//! let head = git.resolve_revision("HEAD")?;
//! git.checkout_worktree(&head)?;
//! for file in git.list_directory(".changelog")? {
//!     println!("{}", file.name);
//! }
//! ```

use std::io::{Cursor, Read};
use std::path::Path;

use super::interface::{
    normalize_path, CommitHistory, CommitInfo, FileInfo, FileKind, GitError, RevisionControl,
};
use crate::core::types::Oid;

/// A git repository opened through git2.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Commit selected by the last checkout
    checkout: Option<git2::Oid>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("checkout", &self.checkout)
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// inside the repository. Bare repositories are accepted.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self {
            repo,
            checkout: None,
        })
    }

    /// Top-level directory of the repository.
    ///
    /// The working directory for normal repositories, the git directory
    /// itself for bare ones.
    pub fn root(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::internal("find remote", e)),
        }
    }

    /// Get the default remote name, preferring "origin".
    ///
    /// Returns the first remote found, or `None` if no remotes exist.
    pub fn default_remote(&self) -> Result<Option<String>, GitError> {
        let remotes = self
            .repo
            .remotes()
            .map_err(|e| GitError::internal("list remotes", e))?;

        for name in remotes.iter().flatten() {
            if name == "origin" {
                return Ok(Some(name.to_string()));
            }
        }

        Ok(remotes.iter().flatten().next().map(String::from))
    }

    fn checked_out_commit(&self) -> Result<git2::Commit<'_>, GitError> {
        let oid = self.checkout.ok_or(GitError::NoCheckout)?;
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::internal("find checked-out commit", e))
    }

    /// Look up `path` in the checked-out tree.
    ///
    /// Returns `None` when the path does not exist.
    fn tree_entry(&self, path: &str) -> Result<Option<git2::TreeEntry<'static>>, GitError> {
        let tree = self
            .checked_out_commit()?
            .tree()
            .map_err(|e| GitError::internal("read tree", e))?;
        match tree.get_path(Path::new(path)) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::internal(path, e)),
        }
    }
}

impl RevisionControl for Git {
    fn resolve_revision(&self, revision: &str) -> Result<Oid, GitError> {
        let not_found = |e: git2::Error| GitError::RevisionNotFound {
            revision: revision.to_string(),
            message: e.message().to_string(),
        };

        let commit = self
            .repo
            .revparse_single(revision)
            .map_err(not_found)?
            .peel_to_commit()
            .map_err(not_found)?;

        Oid::new(commit.id().to_string()).map_err(Into::into)
    }

    fn checkout_worktree(&mut self, revision: &Oid) -> Result<(), GitError> {
        let oid = git2::Oid::from_str(revision.as_str())?;
        // Validate before switching so a bad revision leaves the view alone.
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::RevisionNotFound {
                revision: revision.to_string(),
                message: e.message().to_string(),
            })?;
        self.checkout = Some(oid);
        Ok(())
    }

    fn list_directory(&self, path: &str) -> Result<Vec<FileInfo>, GitError> {
        let path = normalize_path(path);
        let commit = self.checked_out_commit()?;
        let root = commit
            .tree()
            .map_err(|e| GitError::internal("read tree", e))?;

        let tree = if path.is_empty() {
            root
        } else {
            let entry = match self.tree_entry(path)? {
                Some(entry) => entry,
                None => return Ok(Vec::new()),
            };
            if entry.kind() != Some(git2::ObjectType::Tree) {
                return Err(GitError::NotADirectory {
                    path: path.to_string(),
                });
            }
            self.repo
                .find_tree(entry.id())
                .map_err(|e| GitError::internal(path, e))?
        };

        let files = tree
            .iter()
            .map(|entry| FileInfo {
                name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                kind: match entry.kind() {
                    Some(git2::ObjectType::Blob) => FileKind::File,
                    Some(git2::ObjectType::Tree) => FileKind::Directory,
                    _ => FileKind::Other,
                },
            })
            .collect();

        Ok(files)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, GitError> {
        let path = normalize_path(path);
        let entry = self
            .tree_entry(path)?
            .filter(|entry| entry.kind() == Some(git2::ObjectType::Blob))
            .ok_or_else(|| GitError::FileNotFound {
                path: path.to_string(),
            })?;

        let blob = self
            .repo
            .find_blob(entry.id())
            .map_err(|e| GitError::internal(path, e))?;

        Ok(Box::new(Cursor::new(blob.content().to_vec())))
    }

    fn commit_history(&self, path: &str) -> Result<CommitHistory<'_>, GitError> {
        let start = self.checkout.ok_or(GitError::NoCheckout)?;
        let path = normalize_path(path).to_string();

        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| GitError::internal("revwalk", e))?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
            .map_err(|e| GitError::internal("revwalk", e))?;
        revwalk
            .push(start)
            .map_err(|e| GitError::internal("revwalk", e))?;

        let repo = &self.repo;
        let history = revwalk.filter_map(move |next| {
            let oid = match next {
                Ok(oid) => oid,
                Err(e) => return Some(Err(GitError::internal("revwalk", e))),
            };
            match touches_path(repo, oid, &path) {
                Ok(true) => Some(commit_info(repo, oid)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::new(history))
    }
}

/// Whether the commit changed `path` relative to its parents.
///
/// Mirrors git's default history simplification: a commit touches a path
/// when the path's blob differs from every parent. A root commit touches
/// every path it contains.
fn touches_path(repo: &git2::Repository, oid: git2::Oid, path: &str) -> Result<bool, GitError> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| GitError::internal("find commit", e))?;
    let current = blob_at(&commit, path)?;

    if commit.parent_count() == 0 {
        return Ok(current.is_some());
    }

    for parent in commit.parents() {
        if blob_at(&parent, path)? == current {
            return Ok(false);
        }
    }

    Ok(true)
}

/// The object id stored at `path` in a commit's tree, if any.
fn blob_at(commit: &git2::Commit<'_>, path: &str) -> Result<Option<git2::Oid>, GitError> {
    let tree = commit
        .tree()
        .map_err(|e| GitError::internal("read tree", e))?;
    match tree.get_path(Path::new(path)) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(GitError::internal(path, e)),
    }
}

fn commit_info(repo: &git2::Repository, oid: git2::Oid) -> Result<CommitInfo, GitError> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| GitError::internal("find commit", e))?;

    let author_time = chrono::DateTime::from_timestamp(commit.author().when().seconds(), 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);

    Ok(CommitInfo {
        oid: Oid::new(oid.to_string())?,
        summary: commit.summary().unwrap_or("").to_string(),
        author_time,
    })
}
