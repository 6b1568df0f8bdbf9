//! forge
//!
//! Abstraction for remote forges that can map commits to pull requests.
//!
//! # Architecture
//!
//! The [`IssueResolver`] trait defines the single query the changelog
//! engine needs. The engine receives a resolver as an explicit dependency;
//! it never constructs one itself.
//!
//! # Modules
//!
//! - `traits`: Core `IssueResolver` trait, `ForgeError`, `RepoSlug`
//! - [`github`]: GitHub implementation using the GraphQL API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::forge::github::GitHubResolver;
//! use changelog_build::forge::{IssueResolver, RepoSlug};
//!
//! let repo = RepoSlug::parse("hashicorp/consul")?;
//! let resolver = GitHubResolver::new(token);
//! let pr = resolver
//!     .find_associated_pull_request(&commit, &repo.owner, &repo.name)
//!     .await?;
//! println!("introduced by #{}", pr);
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
