use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::{
    api::{ChecksSession, GithubApiClient},
    error::{GithubError, GithubResult},
};

/// API base URL used when neither credentials nor configuration override it
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Stored credential for talking to GitHub
#[derive(Clone)]
pub struct GithubCredentials {
    token: SecretString,
    api_uri: Option<String>,
}

impl GithubCredentials {
    /// Create credentials from a personal access or installation token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            api_uri: None,
        }
    }

    /// Pin these credentials to a specific API endpoint (GitHub Enterprise)
    pub fn with_api_uri(mut self, api_uri: impl Into<String>) -> Self {
        self.api_uri = Some(api_uri.into());
        self
    }

    /// API endpoint bound to the credential, if any
    pub fn api_uri(&self) -> Option<&str> {
        self.api_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
    }

    /// Get the token (exposed for building the client)
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for GithubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubCredentials")
            .field("token", &"[REDACTED]")
            .field("api_uri", &self.api_uri)
            .finish()
    }
}

/// Hands out an authenticated session for one publish call
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: ChecksSession;

    async fn connect(&self) -> GithubResult<Self::Session>;
}

/// Builds an octocrab-backed session from stored credentials
#[derive(Debug, Clone)]
pub struct GithubSessionProvider {
    credentials: GithubCredentials,
    default_api_url: String,
}

impl GithubSessionProvider {
    pub fn new(credentials: GithubCredentials) -> Self {
        Self::with_default_api_url(credentials, DEFAULT_API_URL)
    }

    /// Use `default_api_url` when the credentials do not name an endpoint
    pub fn with_default_api_url(
        credentials: GithubCredentials,
        default_api_url: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            default_api_url: default_api_url.into(),
        }
    }

    /// Endpoint the next session will talk to
    pub fn api_url(&self) -> &str {
        self.credentials
            .api_uri()
            .unwrap_or(self.default_api_url.as_str())
    }
}

#[async_trait]
impl SessionProvider for GithubSessionProvider {
    type Session = GithubApiClient;

    async fn connect(&self) -> GithubResult<Self::Session> {
        if self.credentials.token().trim().is_empty() {
            return Err(GithubError::AuthError(
                "GitHub token is empty".to_string(),
            ));
        }

        GithubApiClient::new(self.credentials.token().to_string(), self.api_url())
    }
}
