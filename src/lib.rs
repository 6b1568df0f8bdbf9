//! changelog-build - Release notes from changelog entry files
//!
//! Projects that keep one small file per user-visible change (usually
//! under `.changelog/`) can build the notes for a release from the files
//! added since the previous release. This crate finds those files in a
//! git repository, works out which pull request each belongs to, splits
//! them into typed notes, and renders the result.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Diff -> Notes -> Aggregate pipeline
//! - [`core`] - Domain types and configuration
//! - [`git`] - Read-only revision control interface
//! - [`forge`] - Pull request lookups (GitHub)
//! - [`render`] - Markdown and JSON output
//! - [`ui`] - Terminal output and diagnostics
//!
//! # Correctness Invariants
//!
//! 1. An entry appears exactly when its filename exists at the new
//!    revision and not at the old one
//! 2. Results are sorted, so repeated runs give identical output
//! 3. Any failure aborts the run; partial changelogs are never produced
//! 4. The repository is only read, never modified

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod render;
pub mod ui;
