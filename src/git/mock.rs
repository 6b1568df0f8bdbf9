//! git::mock
//!
//! In-memory [`RevisionControl`] implementation for deterministic testing.
//!
//! # Design
//!
//! Revisions are added in order; each one is a full snapshot of file
//! paths to contents. A path's history gains the revision's commit whenever
//! the revision adds or changes that path, so `commit_history` behaves
//! like a linear git history. Directory listings come back in reverse
//! name order so callers cannot rely on listing order.
//!
//! # Example
//!
//! ```
//! use changelog_build::git::mock::MockRepo;
//! use changelog_build::git::RevisionControl;
//!
//! let mut repo = MockRepo::new();
//! repo.add_revision("v0.1.0", &[(".changelog/1.txt", "first")]);
//! repo.add_revision("v0.2.0", &[(".changelog/1.txt", "first"), (".changelog/2.txt", "second")]);
//!
//! let rev = repo.resolve_revision("v0.2.0").unwrap();
//! repo.checkout_worktree(&rev).unwrap();
//! assert_eq!(repo.list_directory(".changelog").unwrap().len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};

use super::interface::{
    normalize_path, CommitHistory, CommitInfo, FileInfo, GitError, RevisionControl,
};
use crate::core::types::Oid;

/// Mock repository for testing.
///
/// Cheap to clone; clones share state, so a test can keep a handle for
/// inspecting recorded operations after lending the repo to the engine.
#[derive(Debug, Clone, Default)]
pub struct MockRepo {
    inner: Arc<Mutex<MockRepoInner>>,
}

#[derive(Debug, Default)]
struct MockRepoInner {
    /// Symbolic names to commits.
    names: HashMap<String, Oid>,
    /// Commits in creation order with their snapshots.
    commits: Vec<MockCommit>,
    /// Commit selected by the last checkout.
    checkout: Option<usize>,
    /// Paths whose history has been wiped.
    no_history: BTreeSet<String>,
    /// Operation to fail on.
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug)]
struct MockCommit {
    info: CommitInfo,
    files: BTreeMap<String, Vec<u8>>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    /// Fail `list_directory` for this path.
    ListDirectory(String),
    /// Fail `open_file` for this path.
    OpenFile(String),
    /// Fail `commit_history` for this path.
    CommitHistory(String),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ResolveRevision { revision: String },
    Checkout { oid: Oid },
    ListDirectory { path: String },
    OpenFile { path: String },
    CommitHistory { path: String },
}

impl MockRepo {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a revision holding exactly `files`, reachable as `name`.
    ///
    /// Returns the commit created for it.
    pub fn add_revision(&mut self, name: &str, files: &[(&str, &str)]) -> Oid {
        let mut inner = self.lock();
        let index = inner.commits.len();
        let oid = mock_oid(index + 1);

        let files: BTreeMap<String, Vec<u8>> = files
            .iter()
            .map(|(path, contents)| (normalize_path(path).to_string(), contents.as_bytes().to_vec()))
            .collect();

        inner.commits.push(MockCommit {
            info: CommitInfo {
                oid: oid.clone(),
                summary: format!("release {}", name),
                author_time: chrono::DateTime::from_timestamp(index as i64 * 60, 0)
                    .unwrap_or(chrono::DateTime::UNIX_EPOCH),
            },
            files,
        });
        inner.names.insert(name.to_string(), oid.clone());
        oid
    }

    /// Make `commit_history` yield nothing for `path`.
    ///
    /// A real repository cannot get into this state; the differ must
    /// still report it.
    pub fn clear_history(&self, path: &str) {
        self.lock().no_history.insert(normalize_path(path).to_string());
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockRepoInner> {
        self.inner.lock().unwrap()
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn should_fail(&self, expected: &FailOn) -> bool {
        self.lock().fail_on.as_ref() == Some(expected)
    }
}

/// Deterministic fake commit id for the n-th commit.
fn mock_oid(n: usize) -> Oid {
    Oid::new(format!("{:040x}", n)).expect("40 hex digits is a valid oid")
}

impl RevisionControl for MockRepo {
    fn resolve_revision(&self, revision: &str) -> Result<Oid, GitError> {
        self.record(MockOperation::ResolveRevision {
            revision: revision.to_string(),
        });

        let inner = self.lock();
        if let Some(oid) = inner.names.get(revision) {
            return Ok(oid.clone());
        }
        inner
            .commits
            .iter()
            .map(|c| &c.info.oid)
            .find(|oid| oid.as_str() == revision)
            .cloned()
            .ok_or_else(|| GitError::RevisionNotFound {
                revision: revision.to_string(),
                message: "unknown revision".to_string(),
            })
    }

    fn checkout_worktree(&mut self, revision: &Oid) -> Result<(), GitError> {
        self.record(MockOperation::Checkout {
            oid: revision.clone(),
        });

        let mut inner = self.lock();
        let index = inner
            .commits
            .iter()
            .position(|c| &c.info.oid == revision)
            .ok_or_else(|| GitError::RevisionNotFound {
                revision: revision.to_string(),
                message: "unknown commit".to_string(),
            })?;
        inner.checkout = Some(index);
        Ok(())
    }

    fn list_directory(&self, path: &str) -> Result<Vec<FileInfo>, GitError> {
        let path = normalize_path(path);
        self.record(MockOperation::ListDirectory {
            path: path.to_string(),
        });
        if self.should_fail(&FailOn::ListDirectory(path.to_string())) {
            return Err(GitError::Internal {
                message: format!("injected failure listing {}", path),
            });
        }

        let inner = self.lock();
        let commit = &inner.commits[inner.checkout.ok_or(GitError::NoCheckout)?];
        if commit.files.contains_key(path) {
            return Err(GitError::NotADirectory {
                path: path.to_string(),
            });
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();
        for file in commit.files.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((dir, _)) => dirs.insert(dir.to_string()),
                    None => files.insert(rest.to_string()),
                };
            }
        }

        let mut listing: Vec<FileInfo> = files
            .into_iter()
            .map(FileInfo::file)
            .chain(dirs.into_iter().map(FileInfo::directory))
            .collect();
        listing.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(listing)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + '_>, GitError> {
        let path = normalize_path(path);
        self.record(MockOperation::OpenFile {
            path: path.to_string(),
        });
        if self.should_fail(&FailOn::OpenFile(path.to_string())) {
            return Err(GitError::Internal {
                message: format!("injected failure reading {}", path),
            });
        }

        let inner = self.lock();
        let commit = &inner.commits[inner.checkout.ok_or(GitError::NoCheckout)?];
        let contents = commit
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::FileNotFound {
                path: path.to_string(),
            })?;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn commit_history(&self, path: &str) -> Result<CommitHistory<'_>, GitError> {
        let path = normalize_path(path);
        self.record(MockOperation::CommitHistory {
            path: path.to_string(),
        });
        if self.should_fail(&FailOn::CommitHistory(path.to_string())) {
            return Err(GitError::Internal {
                message: format!("injected failure walking history of {}", path),
            });
        }

        let inner = self.lock();
        let head = inner.checkout.ok_or(GitError::NoCheckout)?;
        if inner.no_history.contains(path) {
            return Ok(Box::new(std::iter::empty()));
        }

        // Walk from the checkout back to the root, keeping commits where the
        // path's contents changed relative to the previous commit.
        let mut history = Vec::new();
        for index in (0..=head).rev() {
            let current = inner.commits[index].files.get(path);
            let previous = index
                .checked_sub(1)
                .and_then(|p| inner.commits[p].files.get(path));
            if current.is_some() && current != previous {
                history.push(Ok(inner.commits[index].info.clone()));
            }
        }

        Ok(Box::new(history.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_releases() -> MockRepo {
        let mut repo = MockRepo::new();
        repo.add_revision("v1", &[(".changelog/1.txt", "one"), ("README.md", "hi")]);
        repo.add_revision(
            "v2",
            &[
                (".changelog/1.txt", "one, edited"),
                (".changelog/2.txt", "two"),
                (".changelog/nested/3.txt", "three"),
            ],
        );
        repo
    }

    fn checkout(repo: &mut MockRepo, name: &str) {
        let oid = repo.resolve_revision(name).unwrap();
        repo.checkout_worktree(&oid).unwrap();
    }

    #[test]
    fn resolves_names_and_full_oids() {
        let repo = two_releases();
        let v1 = repo.resolve_revision("v1").unwrap();
        assert_eq!(repo.resolve_revision(v1.as_str()).unwrap(), v1);
        assert!(matches!(
            repo.resolve_revision("v3"),
            Err(GitError::RevisionNotFound { .. })
        ));
    }

    #[test]
    fn reads_require_checkout() {
        let repo = two_releases();
        assert!(matches!(
            repo.list_directory(".changelog"),
            Err(GitError::NoCheckout)
        ));
    }

    #[test]
    fn listing_is_reverse_ordered_and_typed() {
        let mut repo = two_releases();
        checkout(&mut repo, "v2");

        let listing = repo.list_directory(".changelog").unwrap();
        let names: Vec<&str> = listing.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["nested", "2.txt", "1.txt"]);
        assert!(!listing[0].is_file());
    }

    #[test]
    fn missing_directory_lists_empty() {
        let mut repo = two_releases();
        checkout(&mut repo, "v1");
        assert!(repo.list_directory("docs").unwrap().is_empty());
    }

    #[test]
    fn file_in_place_of_directory_is_error() {
        let mut repo = two_releases();
        checkout(&mut repo, "v1");
        assert!(matches!(
            repo.list_directory("README.md"),
            Err(GitError::NotADirectory { .. })
        ));
    }

    #[test]
    fn open_file_reads_checked_out_contents() {
        let mut repo = two_releases();
        checkout(&mut repo, "v1");
        let mut contents = String::new();
        repo.open_file(".changelog/1.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "one");
    }

    #[test]
    fn history_tracks_changes_most_recent_first() {
        let mut repo = two_releases();
        checkout(&mut repo, "v2");

        let history: Vec<Oid> = repo
            .commit_history(".changelog/1.txt")
            .unwrap()
            .map(|c| c.unwrap().oid)
            .collect();
        assert_eq!(
            history,
            vec![
                repo.resolve_revision("v2").unwrap(),
                repo.resolve_revision("v1").unwrap()
            ]
        );
    }

    #[test]
    fn history_carries_commit_details() {
        let mut repo = two_releases();
        checkout(&mut repo, "v2");

        let history: Vec<CommitInfo> = repo
            .commit_history(".changelog/1.txt")
            .unwrap()
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(history[0].summary, "release v2");
        assert_eq!(history[1].summary, "release v1");
        assert!(history[0].author_time > history[1].author_time);
    }

    #[test]
    fn history_is_bounded_by_checkout() {
        let mut repo = two_releases();
        checkout(&mut repo, "v1");
        assert_eq!(repo.commit_history(".changelog/2.txt").unwrap().count(), 0);
    }

    #[test]
    fn cleared_history_is_empty() {
        let mut repo = two_releases();
        repo.clear_history(".changelog/2.txt");
        checkout(&mut repo, "v2");
        assert_eq!(repo.commit_history(".changelog/2.txt").unwrap().count(), 0);
    }

    #[test]
    fn injected_failures() {
        let mut repo = two_releases().fail_on(FailOn::OpenFile(".changelog/2.txt".into()));
        checkout(&mut repo, "v2");
        assert!(repo.open_file(".changelog/1.txt").is_ok());
        assert!(repo.open_file(".changelog/2.txt").is_err());
    }

    #[test]
    fn records_operations() {
        let mut repo = two_releases();
        checkout(&mut repo, "v1");
        let ops = repo.operations();
        assert!(matches!(ops[0], MockOperation::ResolveRevision { .. }));
        assert!(matches!(ops[1], MockOperation::Checkout { .. }));
    }
}
