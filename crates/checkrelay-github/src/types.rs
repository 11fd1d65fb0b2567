use checkrelay_core::CheckRunId;
use serde::{Deserialize, Serialize};

/// The part of `GET /repos/{owner}/{repo}` the publisher needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryVisibility {
    pub full_name: Option<String>,
    pub private: bool,
}

/// The part of `GET /users/{username}` used to confirm an account exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub login: String,
}

/// Check run as returned by the create and update endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    pub id: CheckRunId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}
