//! forge::traits
//!
//! Issue resolver trait definition and shared forge types.
//!
//! # Design
//!
//! The `IssueResolver` trait is async because resolution involves network
//! I/O. Callers await one query at a time; nothing here retries.
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::forge::{IssueResolver, ForgeError, RepoSlug};
//!
//! async fn pr_for(resolver: &dyn IssueResolver, commit: &Oid) -> Result<u64, ForgeError> {
//!     let repo = RepoSlug::parse("hashicorp/consul")?;
//!     resolver
//!         .find_associated_pull_request(commit, &repo.owner, &repo.name)
//!         .await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::Oid;

/// Errors from forge operations.
///
/// These error types map to common failure modes when querying remote
/// hosting services like GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A repository reference could not be parsed.
    #[error("invalid repository '{0}': must be set as 'owner/name', e.g. 'hashicorp/consul'")]
    InvalidRepo(String),
}

/// A hosted repository, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// User or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSlug {
    /// Parse `owner/name`.
    ///
    /// # Example
    ///
    /// ```
    /// use changelog_build::forge::RepoSlug;
    ///
    /// let repo = RepoSlug::parse("hashicorp/consul").unwrap();
    /// assert_eq!(repo.owner, "hashicorp");
    /// assert_eq!(repo.name, "consul");
    ///
    /// assert!(RepoSlug::parse("consul").is_err());
    /// assert!(RepoSlug::parse("a/b/c").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ForgeError> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ForgeError::InvalidRepo(s.to_string())),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Maps commits to the pull requests that introduced them.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// - `NotFound`: the commit has no associated pull request
/// - `AuthRequired` / `AuthFailed`: token missing or rejected
/// - `RateLimited`, `ApiError`, `NetworkError`: the query itself failed
#[async_trait]
pub trait IssueResolver: Send + Sync {
    /// Get the resolver name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Find the number of the pull request associated with `commit` in
    /// `owner/name`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no pull request is associated with the commit
    async fn find_associated_pull_request(
        &self,
        commit: &Oid,
        owner: &str,
        name: &str,
    ) -> Result<u64, ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", ForgeError::AuthFailed("expired token".into())),
            "authentication failed: expired token"
        );
        assert_eq!(
            format!("{}", ForgeError::NotFound("PR for abc".into())),
            "not found: PR for abc"
        );
        assert_eq!(format!("{}", ForgeError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 502,
                    message: "Bad gateway".into()
                }
            ),
            "API error: 502 - Bad gateway"
        );
        assert_eq!(
            format!("{}", ForgeError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }

    mod repo_slug {
        use super::*;

        #[test]
        fn parses_owner_and_name() {
            let repo = RepoSlug::parse("octocat/hello-world").unwrap();
            assert_eq!(repo.owner, "octocat");
            assert_eq!(repo.name, "hello-world");
            assert_eq!(repo.to_string(), "octocat/hello-world");
        }

        #[test]
        fn rejects_malformed() {
            for bad in ["", "octocat", "/repo", "owner/", "a/b/c"] {
                assert!(
                    matches!(RepoSlug::parse(bad), Err(ForgeError::InvalidRepo(_))),
                    "{bad} should be rejected"
                );
            }
        }
    }
}
