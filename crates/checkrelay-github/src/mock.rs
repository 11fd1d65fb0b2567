use async_trait::async_trait;
use checkrelay_core::{CheckRunId, CheckRunPayload};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    api::ChecksSession,
    auth::SessionProvider,
    error::{GithubError, GithubResult},
    types::{CheckRun, UserProfile},
};

const FIRST_CHECK_RUN_ID: CheckRunId = 1000;

/// A call received by [`MockSession`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    IsPrivate {
        repository: String,
    },
    GetUser {
        username: String,
    },
    IsMemberOf {
        username: String,
        organization: String,
    },
    CreateCheckRun {
        repository: String,
        payload: CheckRunPayload,
    },
    UpdateCheckRun {
        repository: String,
        id: CheckRunId,
        payload: CheckRunPayload,
    },
}

#[derive(Debug)]
struct MockState {
    private_repositories: HashSet<String>,
    members: HashSet<(String, String)>,
    fail_visibility: bool,
    fail_membership: bool,
    fail_writes: bool,
    next_id: CheckRunId,
    calls: Vec<SessionCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            private_repositories: HashSet::new(),
            members: HashSet::new(),
            fail_visibility: false,
            fail_membership: false,
            fail_writes: false,
            next_id: FIRST_CHECK_RUN_ID,
            calls: Vec::new(),
        }
    }
}

/// In-memory GitHub session for tests and dry runs
///
/// Clones share state, so a clone handed to a publisher can be inspected
/// afterwards. Every repository is public and every user exists unless
/// configured otherwise.
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_private_repository(self, repository: impl Into<String>) -> Self {
        self.state().private_repositories.insert(repository.into());
        self
    }

    pub fn with_member(self, username: impl Into<String>, organization: impl Into<String>) -> Self {
        self.state()
            .members
            .insert((username.into(), organization.into()));
        self
    }

    /// Make repository lookups fail
    pub fn failing_visibility(self) -> Self {
        self.state().fail_visibility = true;
        self
    }

    /// Make user and membership lookups fail
    pub fn failing_membership(self) -> Self {
        self.state().fail_membership = true;
        self
    }

    /// Make check run creates and updates fail
    pub fn failing_writes(self) -> Self {
        self.state().fail_writes = true;
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<SessionCall> {
        self.state().calls.clone()
    }

    /// Number of user or membership lookups received
    pub fn membership_lookups(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    SessionCall::GetUser { .. } | SessionCall::IsMemberOf { .. }
                )
            })
            .count()
    }

    pub fn creates(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, SessionCall::CreateCheckRun { .. }))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, SessionCall::UpdateCheckRun { .. }))
            .count()
    }

    /// Payloads of creates and updates, in order
    pub fn written_payloads(&self) -> Vec<CheckRunPayload> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                SessionCall::CreateCheckRun { payload, .. }
                | SessionCall::UpdateCheckRun { payload, .. } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }
}

fn check_run(id: CheckRunId, payload: &CheckRunPayload) -> CheckRun {
    CheckRun {
        id,
        name: Some(payload.name.clone()),
        status: Some(payload.status.to_string()),
        conclusion: payload.conclusion.map(|c| c.to_string()),
        html_url: None,
    }
}

#[async_trait]
impl ChecksSession for MockSession {
    async fn is_private(&self, repository: &str) -> GithubResult<bool> {
        let mut state = self.state();
        state.calls.push(SessionCall::IsPrivate {
            repository: repository.to_string(),
        });
        if state.fail_visibility {
            return Err(GithubError::ApiError(format!(
                "Failed to fetch repository {}: simulated outage",
                repository
            )));
        }
        Ok(state.private_repositories.contains(repository))
    }

    async fn get_user(&self, username: &str) -> GithubResult<UserProfile> {
        let mut state = self.state();
        state.calls.push(SessionCall::GetUser {
            username: username.to_string(),
        });
        if state.fail_membership {
            return Err(GithubError::ApiError(format!(
                "Failed to fetch user {}: simulated outage",
                username
            )));
        }
        Ok(UserProfile {
            id: 1,
            login: username.to_string(),
        })
    }

    async fn is_member_of(&self, username: &str, organization: &str) -> GithubResult<bool> {
        let mut state = self.state();
        state.calls.push(SessionCall::IsMemberOf {
            username: username.to_string(),
            organization: organization.to_string(),
        });
        if state.fail_membership {
            return Err(GithubError::ApiError(format!(
                "Failed to check membership of {} in {}: simulated outage",
                username, organization
            )));
        }
        Ok(state
            .members
            .contains(&(username.to_string(), organization.to_string())))
    }

    async fn create_check_run(
        &self,
        repository: &str,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun> {
        let mut state = self.state();
        state.calls.push(SessionCall::CreateCheckRun {
            repository: repository.to_string(),
            payload: payload.clone(),
        });
        if state.fail_writes {
            return Err(GithubError::ApiError(format!(
                "Failed to create check run {}: simulated outage",
                payload.name
            )));
        }
        let id = state.next_id;
        state.next_id += 1;
        Ok(check_run(id, payload))
    }

    async fn update_check_run(
        &self,
        repository: &str,
        id: CheckRunId,
        payload: &CheckRunPayload,
    ) -> GithubResult<CheckRun> {
        let mut state = self.state();
        state.calls.push(SessionCall::UpdateCheckRun {
            repository: repository.to_string(),
            id,
            payload: payload.clone(),
        });
        if state.fail_writes {
            return Err(GithubError::ApiError(format!(
                "Failed to update check run {} ({}): simulated outage",
                payload.name, id
            )));
        }
        Ok(check_run(id, payload))
    }
}

/// Session provider handing out clones of one [`MockSession`]
#[derive(Debug, Clone, Default)]
pub struct MockSessionProvider {
    session: MockSession,
    fail_connect: bool,
}

impl MockSessionProvider {
    pub fn new(session: MockSession) -> Self {
        Self {
            session,
            fail_connect: false,
        }
    }

    /// Provider whose connect always fails
    pub fn unreachable() -> Self {
        Self {
            session: MockSession::new(),
            fail_connect: true,
        }
    }

    pub fn session(&self) -> &MockSession {
        &self.session
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    type Session = MockSession;

    async fn connect(&self) -> GithubResult<Self::Session> {
        if self.fail_connect {
            return Err(GithubError::AuthError(
                "simulated connection failure".to_string(),
            ));
        }
        Ok(self.session.clone())
    }
}
