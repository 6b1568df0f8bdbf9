//! forge::github
//!
//! GitHub issue resolver using the GraphQL API.
//!
//! # Design
//!
//! A single GraphQL query maps a commit to the first pull request GitHub
//! associates with it. The token is handed to the constructor; nothing is
//! read from the environment here.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. There is no
//! automatic retry.
//!
//! # Example
//!
//! ```ignore
//! use changelog_build::forge::github::GitHubResolver;
//! use changelog_build::forge::IssueResolver;
//!
//! let resolver = GitHubResolver::new(token);
//! let number = resolver
//!     .find_associated_pull_request(&commit, "hashicorp", "consul")
//!     .await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::traits::{ForgeError, IssueResolver};
use crate::core::types::Oid;

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "changelog-build";

/// Query for the first pull request associated with a commit.
const ASSOCIATED_PULL_REQUESTS_QUERY: &str = r#"query($owner: String!, $name: String!, $sha: String!) {
  repository(owner: $owner, name: $name) {
    object(expression: $sha) {
      ... on Commit {
        associatedPullRequests(first: 1) {
          nodes { number }
        }
      }
    }
  }
}"#;

/// GitHub issue resolver.
pub struct GitHubResolver {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token
    token: String,
    /// GraphQL endpoint (configurable for GitHub Enterprise)
    graphql_url: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubResolver")
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

impl GitHubResolver {
    /// Create a resolver for github.com.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token with `repo` scope
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_graphql_url(token, DEFAULT_GRAPHQL_URL)
    }

    /// Create a resolver against a custom GraphQL endpoint.
    ///
    /// Use this for GitHub Enterprise installations, e.g.
    /// `https://github.example.com/api/graphql`.
    pub fn with_graphql_url(token: impl Into<String>, graphql_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            graphql_url: graphql_url.into(),
        }
    }

    /// The GraphQL endpoint in use.
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    /// Map a non-success response to an error.
    async fn error_from_response(response: Response) -> ForgeError {
        let status = response.status();
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl IssueResolver for GitHubResolver {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn find_associated_pull_request(
        &self,
        commit: &Oid,
        owner: &str,
        name: &str,
    ) -> Result<u64, ForgeError> {
        let body = serde_json::json!({
            "query": ASSOCIATED_PULL_REQUESTS_QUERY,
            "variables": {
                "owner": owner,
                "name": name,
                "sha": commit.as_str(),
            }
        });

        let response = self
            .client
            .post(&self.graphql_url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let result: GraphQLResponse =
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse GraphQL response: {}", e),
            })?;

        if let Some(error) = result.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(ForgeError::ApiError {
                status: status.as_u16(),
                message: error.message.clone(),
            });
        }

        result
            .first_pull_request_number()
            .ok_or_else(|| {
                ForgeError::NotFound(format!(
                    "could not determine pull request for commit {}",
                    commit
                ))
            })
    }
}

// --------------------------------------------------------------------------
// API Response Types
// --------------------------------------------------------------------------

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GraphQL response wrapper.
#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<AssociatedPullRequestsData>,
    errors: Option<Vec<GraphQLError>>,
}

impl GraphQLResponse {
    fn first_pull_request_number(self) -> Option<u64> {
        self.data?
            .repository?
            .object?
            .associated_pull_requests?
            .nodes
            .into_iter()
            .flatten()
            .next()
            .map(|node| node.number)
    }
}

/// GraphQL error format.
#[derive(Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Deserialize)]
struct AssociatedPullRequestsData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    object: Option<CommitNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    associated_pull_requests: Option<PullRequestConnection>,
}

#[derive(Deserialize)]
struct PullRequestConnection {
    #[serde(default)]
    nodes: Vec<Option<PullRequestNode>>,
}

#[derive(Deserialize)]
struct PullRequestNode {
    number: u64,
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use changelog_build::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_github_url {
        use super::*;

        #[test]
        fn ssh_with_git_suffix() {
            assert_eq!(
                parse_github_url("git@github.com:owner/repo.git"),
                Some(("owner".to_string(), "repo".to_string()))
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                parse_github_url("https://github.com/owner/repo"),
                Some(("owner".to_string(), "repo".to_string()))
            );
        }

        #[test]
        fn http_format() {
            assert_eq!(
                parse_github_url("http://github.com/owner/repo.git"),
                Some(("owner".to_string(), "repo".to_string()))
            );
        }

        #[test]
        fn non_github_url() {
            assert_eq!(parse_github_url("https://gitlab.com/owner/repo.git"), None);
        }

        #[test]
        fn invalid_format() {
            assert_eq!(parse_github_url("not-a-url"), None);
            assert_eq!(parse_github_url("https://github.com/owner"), None);
            assert_eq!(parse_github_url("https://github.com/owner/"), None);
        }

        #[test]
        fn repo_with_dots() {
            assert_eq!(
                parse_github_url("git@github.com:owner/repo.name.git"),
                Some(("owner".to_string(), "repo.name".to_string()))
            );
        }
    }

    mod resolver {
        use super::*;

        #[test]
        fn new_uses_default_endpoint() {
            let resolver = GitHubResolver::new("token");
            assert_eq!(resolver.graphql_url(), DEFAULT_GRAPHQL_URL);
            assert_eq!(resolver.name(), "github");
        }

        #[test]
        fn debug_redacts_token() {
            let resolver = GitHubResolver::new("ghp_secret");
            let debug = format!("{:?}", resolver);
            assert!(!debug.contains("ghp_secret"));
            assert!(debug.contains("graphql_url"));
        }

        #[test]
        fn empty_token_requires_auth() {
            let resolver = GitHubResolver::new("");
            assert_eq!(resolver.headers().unwrap_err(), ForgeError::AuthRequired);
        }

        #[test]
        fn headers_carry_bearer_token() {
            let resolver = GitHubResolver::new("abc");
            let headers = resolver.headers().unwrap();
            assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        }
    }

    mod response_parsing {
        use super::*;

        fn parse(json: &str) -> GraphQLResponse {
            serde_json::from_str(json).unwrap()
        }

        #[test]
        fn first_node_wins() {
            let response = parse(
                r#"{"data":{"repository":{"object":{"associatedPullRequests":{"nodes":[{"number":42},{"number":7}]}}}}}"#,
            );
            assert_eq!(response.first_pull_request_number(), Some(42));
        }

        #[test]
        fn empty_nodes_is_none() {
            let response = parse(
                r#"{"data":{"repository":{"object":{"associatedPullRequests":{"nodes":[]}}}}}"#,
            );
            assert_eq!(response.first_pull_request_number(), None);
        }

        #[test]
        fn missing_object_is_none() {
            let response = parse(r#"{"data":{"repository":{"object":null}}}"#);
            assert_eq!(response.first_pull_request_number(), None);
        }
    }
}
