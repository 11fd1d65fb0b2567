pub mod api;
pub mod auth;
pub mod error;
pub mod mock;
pub mod types;

// Re-export commonly used types
pub use api::{ChecksSession, GithubApiClient};
pub use auth::{DEFAULT_API_URL, GithubCredentials, GithubSessionProvider, SessionProvider};
pub use error::{GithubError, GithubResult};
pub use mock::{MockSession, MockSessionProvider, SessionCall};
pub use types::{CheckRun, RepositoryVisibility, UserProfile};
