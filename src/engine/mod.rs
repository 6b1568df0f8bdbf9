//! engine
//!
//! Turns two revisions of a repository into render-ready changelog data.
//!
//! # Architecture
//!
//! The engine runs in three stages, each usable on its own:
//!
//! ```text
//! Diff -> Notes -> Aggregate
//! ```
//!
//! 1. [`diff`]: find entry files added between two revisions and assign
//!    each one an issue identifier
//! 2. [`notes`]: split every entry body into typed notes
//! 3. [`aggregate`]: group notes by type and order them
//!
//! Revision control and issue lookup are injected through
//! [`RevisionControl`](crate::git::RevisionControl) and
//! [`IssueResolver`](crate::forge::IssueResolver). The engine never opens a
//! repository or talks to the network on its own.
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::engine::{build_changelog, diff};
//! use changelog_build::git::Git;
//!
//! let mut git = Git::open(Path::new("."))?;
//! let entries = diff(&mut git, "v1.0.0", "v1.1.0", ".changelog")?;
//! let changelog = build_changelog(&entries);
//! ```

pub mod aggregate;
pub mod diff;
pub mod notes;

pub use aggregate::{aggregate, build_changelog, compare_notes, Changelog, NotesByType};
pub use diff::{
    diff, diff_with_issue_resolution, issue_from_filename, DiffError, NO_PREVIOUS_RELEASE,
};
pub use notes::{notes_from_entry, DEFAULT_NOTE_TYPE};
