//! engine::diff
//!
//! Computes the changelog entries introduced between two revisions.
//!
//! # Algorithm
//!
//! 1. Check out the new revision and read every file directly inside the
//!    entries directory, pairing its contents with the most recent commit
//!    that touched it.
//! 2. Unless the old revision is [`NO_PREVIOUS_RELEASE`], check out the old
//!    revision and drop every filename that already existed there. Only
//!    names are compared, never contents.
//! 3. Resolve each surviving file to an issue identifier, either from its
//!    filename or by asking an [`IssueResolver`] about its commit.
//! 4. Sort by identifier, lexicographically.
//!
//! Every failure aborts the whole diff; callers never see a partial list.

use std::collections::HashMap;
use std::io::Read;

use thiserror::Error;
use tracing::debug;

use crate::core::types::{Entry, Oid};
use crate::forge::{ForgeError, IssueResolver};
use crate::git::{join_path, GitError, RevisionControl};

/// Old-revision sentinel meaning "no prior release": every entry counts.
pub const NO_PREVIOUS_RELEASE: &str = "-";

/// Errors from computing an entry diff.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A revision could not be resolved to a commit.
    #[error("failed to resolve revision '{revision}'")]
    Revision {
        revision: String,
        #[source]
        source: GitError,
    },

    /// A resolved revision could not be checked out.
    #[error("failed to check out {revision}")]
    Checkout {
        revision: Oid,
        #[source]
        source: GitError,
    },

    /// The entries directory could not be listed.
    #[error("failed to list entries directory '{path}'")]
    List {
        path: String,
        #[source]
        source: GitError,
    },

    /// An entry file could not be opened.
    #[error("failed to open entry file '{path}'")]
    Open {
        path: String,
        #[source]
        source: GitError,
    },

    /// An entry file could not be read.
    #[error("failed to read entry file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The history of an entry file could not be walked.
    #[error("failed to read history of '{path}'")]
    History {
        path: String,
        #[source]
        source: GitError,
    },

    /// An entry file exists but no commit ever touched it.
    #[error("found no commits for '{path}'")]
    MissingHistory { path: String },

    /// The pull request for an entry's commit could not be determined.
    #[error("failed to resolve pull request for commit {commit} (entry '{path}')")]
    IssueResolution {
        commit: Oid,
        path: String,
        #[source]
        source: ForgeError,
    },
}

/// An entry file read at the new revision, before identifier resolution.
#[derive(Debug, Clone)]
struct EntryFile {
    contents: Vec<u8>,
    commit: Oid,
}

impl EntryFile {
    fn body(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// Compute the entries added between `old` and `new`, deriving each
/// entry's identifier from its filename (minus a trailing `.txt`).
///
/// # Example
///
/// ```
/// use changelog_build::engine::diff;
/// use changelog_build::git::mock::MockRepo;
///
/// let mut repo = MockRepo::new();
/// repo.add_revision("v1", &[(".changelog/10.txt", "old")]);
/// repo.add_revision("v2", &[(".changelog/10.txt", "old"), (".changelog/2.txt", "new")]);
///
/// let entries = diff(&mut repo, "v1", "v2", ".changelog").unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].issue, "2");
/// ```
pub fn diff<R>(vcs: &mut R, old: &str, new: &str, entries_dir: &str) -> Result<Vec<Entry>, DiffError>
where
    R: RevisionControl + ?Sized,
{
    let files = new_entry_files(vcs, old, new, entries_dir)?;

    let entries = files
        .into_iter()
        .map(|(filename, file)| Entry::new(issue_from_filename(&filename), file.body()))
        .collect();

    Ok(sort_entries(entries))
}

/// Compute the entries added between `old` and `new`, resolving each
/// entry's identifier to the pull request that introduced its file.
///
/// Queries are issued one at a time. The first failure aborts the diff
/// with an error naming the commit.
pub async fn diff_with_issue_resolution<R>(
    vcs: &mut R,
    old: &str,
    new: &str,
    entries_dir: &str,
    owner: &str,
    name: &str,
    resolver: &dyn IssueResolver,
) -> Result<Vec<Entry>, DiffError>
where
    R: RevisionControl + ?Sized,
{
    let files = new_entry_files(vcs, old, new, entries_dir)?;

    let mut entries = Vec::with_capacity(files.len());
    for (filename, file) in files {
        let number = resolver
            .find_associated_pull_request(&file.commit, owner, name)
            .await
            .map_err(|source| DiffError::IssueResolution {
                commit: file.commit.clone(),
                path: join_path(entries_dir, &filename),
                source,
            })?;
        debug!(
            resolver = resolver.name(),
            file = %filename,
            commit = %file.commit.short(10),
            pull_request = number,
            "resolved entry"
        );
        entries.push(Entry::new(number.to_string(), file.body()));
    }

    Ok(sort_entries(entries))
}

/// Strip a trailing `.txt` from an entry filename.
///
/// # Example
///
/// ```
/// use changelog_build::engine::issue_from_filename;
///
/// assert_eq!(issue_from_filename("1234.txt"), "1234");
/// assert_eq!(issue_from_filename("1234.md"), "1234.md");
/// ```
pub fn issue_from_filename(filename: &str) -> String {
    filename
        .strip_suffix(".txt")
        .unwrap_or(filename)
        .to_string()
}

/// Sort entries by issue, comparing identifiers as strings.
///
/// `"10"` sorts before `"2"`. Entries sharing an issue (two files from one
/// pull request) fall back to body order so the result is total.
fn sort_entries(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| a.issue.cmp(&b.issue).then_with(|| a.body.cmp(&b.body)));
    entries
}

/// Entry files present at `new` but not at `old`, keyed by filename.
fn new_entry_files<R>(
    vcs: &mut R,
    old: &str,
    new: &str,
    entries_dir: &str,
) -> Result<HashMap<String, EntryFile>, DiffError>
where
    R: RevisionControl + ?Sized,
{
    let new_rev = resolve(vcs, new)?;
    let old_rev = if old == NO_PREVIOUS_RELEASE {
        None
    } else {
        Some(resolve(vcs, old)?)
    };

    checkout(vcs, &new_rev)?;
    let mut files = read_entry_files(vcs, entries_dir)?;
    debug!(revision = new, count = files.len(), "read entry files");

    if let Some(old_rev) = old_rev {
        checkout(vcs, &old_rev)?;
        let existing = vcs
            .list_directory(entries_dir)
            .map_err(|source| DiffError::List {
                path: entries_dir.to_string(),
                source,
            })?;
        for file in existing {
            files.remove(&file.name);
        }
        debug!(revision = old, remaining = files.len(), "removed released entries");
    }

    Ok(files)
}

fn resolve<R>(vcs: &R, revision: &str) -> Result<Oid, DiffError>
where
    R: RevisionControl + ?Sized,
{
    vcs.resolve_revision(revision)
        .map_err(|source| DiffError::Revision {
            revision: revision.to_string(),
            source,
        })
}

fn checkout<R>(vcs: &mut R, revision: &Oid) -> Result<(), DiffError>
where
    R: RevisionControl + ?Sized,
{
    vcs.checkout_worktree(revision)
        .map_err(|source| DiffError::Checkout {
            revision: revision.clone(),
            source,
        })
}

/// Read every file directly inside `entries_dir` at the checked-out
/// revision, along with its introducing commit.
fn read_entry_files<R>(vcs: &R, entries_dir: &str) -> Result<HashMap<String, EntryFile>, DiffError>
where
    R: RevisionControl + ?Sized,
{
    let listing = vcs
        .list_directory(entries_dir)
        .map_err(|source| DiffError::List {
            path: entries_dir.to_string(),
            source,
        })?;

    let mut files = HashMap::with_capacity(listing.len());
    for info in listing {
        if !info.is_file() {
            debug!(name = %info.name, "skipping non-file in entries directory");
            continue;
        }
        let path = join_path(entries_dir, &info.name);

        let mut contents = Vec::new();
        vcs.open_file(&path)
            .map_err(|source| DiffError::Open {
                path: path.clone(),
                source,
            })?
            .read_to_end(&mut contents)
            .map_err(|source| DiffError::Io {
                path: path.clone(),
                source,
            })?;

        let latest = vcs
            .commit_history(&path)
            .map_err(|source| DiffError::History {
                path: path.clone(),
                source,
            })?
            .next()
            .transpose()
            .map_err(|source| DiffError::History {
                path: path.clone(),
                source,
            })?
            .ok_or_else(|| DiffError::MissingHistory { path: path.clone() })?;
        debug!(
            file = %path,
            commit = %latest.oid.short(10),
            summary = %latest.summary,
            author_time = %latest.author_time,
            "found introducing commit"
        );

        files.insert(
            info.name,
            EntryFile {
                contents,
                commit: latest.oid,
            },
        );
    }

    Ok(files)
}
