use checkrelay_github::{ChecksSession, GithubResult};
use tracing::{debug, warn};

use crate::log::{BuildLog, sanitize_log_line};

/// Resolves whether a contributor belongs to the trusted organization
#[derive(Debug, Clone)]
pub struct MembershipResolver {
    organization: String,
}

impl MembershipResolver {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Membership of `username`, failing closed
    ///
    /// Private repositories skip the lookup and count as trusted. Any
    /// lookup error is logged and reported as "not a member".
    pub async fn is_org_member<S>(
        &self,
        session: &S,
        username: &str,
        is_private: bool,
        log: &mut dyn BuildLog,
    ) -> bool
    where
        S: ChecksSession + ?Sized,
    {
        if is_private {
            debug!("Skipping organization lookup for private repository");
            return true;
        }

        match self.lookup(session, username).await {
            Ok(is_member) => {
                log.log(&format!("inGithubOrg: {}", is_member));
                is_member
            }
            Err(e) => {
                warn!(
                    "{}",
                    sanitize_log_line(&format!(
                        "Membership lookup of {} in {} failed: {}",
                        username, self.organization, e
                    ))
                );
                log.log(&format!("Failed to connect to GitHub {}", e));
                false
            }
        }
    }

    async fn lookup<S>(&self, session: &S, username: &str) -> GithubResult<bool>
    where
        S: ChecksSession + ?Sized,
    {
        session.get_user(username).await?;
        session.is_member_of(username, &self.organization).await
    }
}
