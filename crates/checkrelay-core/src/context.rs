use serde::{Deserialize, Serialize};

/// Build-scoped facts a check run is published against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunContext {
    /// Repository full name, e.g. `owner/repo`
    pub repository: String,

    /// Commit the check run is attached to
    pub head_sha: String,

    /// Full name of the job; sent as the check run's external id
    pub job_name: String,

    /// URL of the build, used when a request carries no details URL
    pub build_url: String,

    /// Pull request author, `None` when the build is not for a pull request
    pub contributor: Option<String>,
}

impl CheckRunContext {
    pub fn new(
        repository: impl Into<String>,
        head_sha: impl Into<String>,
        job_name: impl Into<String>,
        build_url: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            head_sha: head_sha.into(),
            job_name: job_name.into(),
            build_url: build_url.into(),
            contributor: None,
        }
    }

    /// Set the contributor; a blank name means "unknown"
    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        let contributor = contributor.into();
        self.contributor = if contributor.trim().is_empty() {
            None
        } else {
            Some(contributor)
        };
        self
    }

    /// Build URL, or `None` when the build did not expose one
    pub fn build_url(&self) -> Option<&str> {
        if self.build_url.trim().is_empty() {
            None
        } else {
            Some(&self.build_url)
        }
    }
}
