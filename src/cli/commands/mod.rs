//! cli::commands
//!
//! Command implementations.
//!
//! # Architecture
//!
//! Commands are synchronous functions returning `anyhow::Result`. The one
//! async step (pull request lookups) runs on a tokio runtime created for
//! the duration of the call with `block_on`.

mod build;

pub use build::{build, resolve_settings, Settings, GITHUB_TOKEN_ENV};
