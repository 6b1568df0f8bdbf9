//! git
//!
//! Revision-control access for the changelog engine.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. The engine talks to the
//! [`RevisionControl`] trait; [`Git`] implements it with git2 and no other
//! module imports `git2` directly. [`mock::MockRepo`] implements it in
//! memory for tests.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Revision resolution
//! - Reading directory listings and file contents at a revision
//! - Walking the commits that touched a path
//! - Remote URL lookup
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::git::{Git, RevisionControl};
//! use std::path::Path;
//!
//! let mut git = Git::open(Path::new("."))?;
//! let rev = git.resolve_revision("v1.2.0")?;
//! git.checkout_worktree(&rev)?;
//! let latest = git.commit_history(".changelog/1234.txt")?.next();
//! ```

mod interface;
pub mod mock;
mod repository;

pub use interface::{
    join_path, normalize_path, CommitHistory, CommitInfo, FileInfo, FileKind, GitError,
    RevisionControl,
};
pub use repository::Git;
