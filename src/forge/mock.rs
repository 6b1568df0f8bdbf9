//! forge::mock
//!
//! Mock issue resolver for deterministic testing.
//!
//! # Design
//!
//! The mock stores a commit → pull request table in memory, records every
//! query it receives, and can be configured to fail for a given commit.
//!
//! # Example
//!
//! ```
//! use changelog_build::core::types::Oid;
//! use changelog_build::forge::mock::MockResolver;
//! use changelog_build::forge::IssueResolver;
//!
//! # tokio_test_block_on(async {
//! let commit = Oid::new("a".repeat(40)).unwrap();
//! let resolver = MockResolver::new().with_pull_request(&commit, 42);
//!
//! let number = resolver
//!     .find_associated_pull_request(&commit, "owner", "repo")
//!     .await
//!     .unwrap();
//! assert_eq!(number, 42);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{ForgeError, IssueResolver};
use crate::core::types::Oid;

/// Mock resolver for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockResolverInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockResolverInner {
    /// Pull request number by commit.
    pulls: HashMap<Oid, u64>,
    /// Commit to fail on, and the error to return.
    fail_on: Option<(Oid, ForgeError)>,
    /// Recorded queries for verification.
    queries: Vec<MockQuery>,
}

/// Recorded query for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockQuery {
    pub commit: Oid,
    pub owner: String,
    pub name: String,
}

impl MockResolver {
    /// Create a resolver that knows no pull requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `commit` with pull request `number`.
    pub fn with_pull_request(self, commit: &Oid, number: u64) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.pulls.insert(commit.clone(), number);
        }
        self
    }

    /// Fail queries for `commit` with `error`.
    pub fn fail_on(self, commit: &Oid, error: ForgeError) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some((commit.clone(), error));
        }
        self
    }

    /// Get all recorded queries, in the order received.
    pub fn queries(&self) -> Vec<MockQuery> {
        let inner = self.inner.lock().unwrap();
        inner.queries.clone()
    }
}

#[async_trait]
impl IssueResolver for MockResolver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn find_associated_pull_request(
        &self,
        commit: &Oid,
        owner: &str,
        name: &str,
    ) -> Result<u64, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(MockQuery {
            commit: commit.clone(),
            owner: owner.to_string(),
            name: name.to_string(),
        });

        if let Some((failing, error)) = &inner.fail_on {
            if failing == commit {
                return Err(error.clone());
            }
        }

        inner.pulls.get(commit).copied().ok_or_else(|| {
            ForgeError::NotFound(format!(
                "could not determine pull request for commit {}",
                commit
            ))
        })
    }
}
