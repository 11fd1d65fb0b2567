use async_trait::async_trait;
use checkrelay_core::{CheckRunId, CheckRunPayload};
use octocrab::Octocrab;
use tracing::debug;

use crate::{
    error::{GithubError, GithubResult},
    types::{CheckRun, RepositoryVisibility, UserProfile},
};

/// Operations the publisher needs from an authenticated GitHub session
#[async_trait]
pub trait ChecksSession: Send + Sync {
    /// Whether the repository `owner/repo` is private
    async fn is_private(&self, repository: &str) -> GithubResult<bool>;

    /// Resolve a user account; fails when the account does not exist
    async fn get_user(&self, username: &str) -> GithubResult<UserProfile>;

    /// Whether `username` is a public or private member of `organization`
    async fn is_member_of(&self, username: &str, organization: &str) -> GithubResult<bool>;

    /// Create a check run; the payload must carry a head SHA
    async fn create_check_run(
        &self,
        repository: &str,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun>;

    /// Update the existing check run `id`
    async fn update_check_run(
        &self,
        repository: &str,
        id: CheckRunId,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun>;
}

/// GitHub API client for repository operations
pub struct GithubApiClient {
    client: Octocrab,
}

impl GithubApiClient {
    /// Create new GitHub API client with authentication token against `api_url`
    pub fn new(token: String, api_url: &str) -> GithubResult<Self> {
        let client = Octocrab::builder()
            .base_uri(api_url)
            .map_err(|e| GithubError::ApiError(format!("Invalid API URL {}: {}", api_url, e)))?
            .personal_token(token)
            .build()
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to create octocrab client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Create client from existing octocrab instance
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }
}

/// Route prefix for a repository given as `owner/repo`
fn repo_route(repository: &str) -> GithubResult<String> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(format!("/repos/{}/{}", owner, repo))
        }
        _ => Err(GithubError::InvalidRepository(repository.to_string())),
    }
}

/// Accept GitHub user and organization names only
///
/// Alphanumerics and single inner hyphens, at most 39 characters, with an
/// optional `[bot]` suffix for app accounts.
fn validate_login(login: &str) -> GithubResult<()> {
    let name = login.strip_suffix("[bot]").unwrap_or(login);
    let valid = !name.is_empty()
        && name.len() <= 39
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");

    if valid {
        Ok(())
    } else {
        Err(GithubError::InvalidLogin(login.to_string()))
    }
}

#[async_trait]
impl ChecksSession for GithubApiClient {
    async fn is_private(&self, repository: &str) -> GithubResult<bool> {
        let route = repo_route(repository)?;
        let repo: RepositoryVisibility = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to fetch repository {}: {}", repository, e))
            })?;

        Ok(repo.private)
    }

    async fn get_user(&self, username: &str) -> GithubResult<UserProfile> {
        validate_login(username)?;
        let user: UserProfile = self
            .client
            .get(format!("/users/{}", username), None::<&()>)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to fetch user {}: {}", username, e))
            })?;

        Ok(user)
    }

    async fn is_member_of(&self, username: &str, organization: &str) -> GithubResult<bool> {
        validate_login(username)?;
        validate_login(organization)?;

        // 204 for members, 404 otherwise
        let is_member = self
            .client
            .orgs(organization)
            .check_membership(username)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to check membership of {} in {}: {}",
                    username, organization, e
                ))
            })?;

        debug!(
            "Membership of {} in {}: {}",
            username, organization, is_member
        );
        Ok(is_member)
    }

    async fn create_check_run(
        &self,
        repository: &str,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun> {
        if payload.head_sha.is_none() {
            return Err(GithubError::ApiError(format!(
                "Cannot create check run {} without a head SHA",
                payload.name
            )));
        }

        let route = format!("{}/check-runs", repo_route(repository)?);
        let run: CheckRun = self
            .client
            .post(route, Some(payload))
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to create check run {} in {}: {}",
                    payload.name, repository, e
                ))
            })?;

        Ok(run)
    }

    async fn update_check_run(
        &self,
        repository: &str,
        id: CheckRunId,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun> {
        let route = format!("{}/check-runs/{}", repo_route(repository)?, id);
        let run: CheckRun = self
            .client
            .patch(route, Some(payload))
            .await
            .map_err(|e| {
                GithubError::ApiError(format!(
                    "Failed to update check run {} ({}) in {}: {}",
                    payload.name, id, repository, e
                ))
            })?;

        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_api_client() {
        // Initialize rustls crypto provider for tests
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let result = GithubApiClient::new("test-token".to_string(), "https://api.github.com");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_api_client_rejects_bad_url() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let result = GithubApiClient::new("test-token".to_string(), "not a url");
        assert!(matches!(result, Err(GithubError::ApiError(_))));
    }

    #[test]
    fn test_repo_route() {
        assert_eq!(repo_route("octocat/hello").unwrap(), "/repos/octocat/hello");
        assert!(repo_route("hello").is_err());
        assert!(repo_route("/hello").is_err());
        assert!(repo_route("octocat/").is_err());
        assert!(repo_route("a/b/c").is_err());
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("octocat").is_ok());
        assert!(validate_login("mona-lisa").is_ok());
        assert!(validate_login("dependabot[bot]").is_ok());

        assert!(validate_login("").is_err());
        assert!(validate_login("-octocat").is_err());
        assert!(validate_login("octo--cat").is_err());
        assert!(validate_login("octocat/../../orgs/acme").is_err());
        assert!(validate_login("octocat?per_page=1").is_err());
        assert!(validate_login("octo cat").is_err());
        assert!(validate_login(&"a".repeat(40)).is_err());
        assert!(matches!(
            validate_login("a/b"),
            Err(GithubError::InvalidLogin(_))
        ));
    }
}
