use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::context::CheckRunContext;
use crate::request::{
    CheckConclusion, CheckRunAction, CheckRunId, CheckRunOutput, CheckRunRequest, CheckStatus,
};

/// Body sent to GitHub when creating or updating a check run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRunPayload {
    pub name: String,

    /// Only sent on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_sha: Option<String>,

    pub status: CheckStatus,

    pub external_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,

    /// Only sent on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckConclusion>,

    /// Set exactly when `conclusion` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckRunOutput>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<CheckRunAction>,
}

/// Whether a publish creates a new check run or updates a recorded one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// A single remote write, tagged with how it targets the check run
#[derive(Debug, Clone, PartialEq)]
pub enum CheckRunOperation {
    Create { payload: CheckRunPayload },
    Update { id: CheckRunId, payload: CheckRunPayload },
}

impl CheckRunOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
        }
    }

    pub fn payload(&self) -> &CheckRunPayload {
        match self {
            Self::Create { payload } | Self::Update { payload, .. } => payload,
        }
    }
}

/// Payload fields shared by create and update
///
/// `now` fills in the completion time of a concluded run when the request
/// leaves it unset.
pub fn build_payload(
    context: &CheckRunContext,
    request: &CheckRunRequest,
    now: DateTime<Utc>,
) -> CheckRunPayload {
    let details_url = request
        .details_url
        .clone()
        .or_else(|| context.build_url().map(str::to_string));

    let completed_at = request
        .conclusion
        .map(|_| request.completed_at.unwrap_or(now));

    CheckRunPayload {
        name: request.name.clone(),
        head_sha: None,
        status: request.status,
        external_id: context.job_name.clone(),
        details_url,
        started_at: None,
        conclusion: request.conclusion,
        completed_at,
        output: request.output.clone().map(CheckRunOutput::truncated),
        actions: request.actions.clone(),
    }
}

/// Pick create or update from a previously recorded check run id
///
/// # Examples
///
/// ```
/// use checkrelay_core::{CheckRunContext, CheckRunRequest, CheckStatus, OperationKind, plan_operation};
///
/// let context = CheckRunContext::new("owner/repo", "abc123", "folder/job", "https://ci/job/1/");
/// let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress);
/// let now = chrono::Utc::now();
///
/// assert_eq!(plan_operation(None, &context, &request, now).kind(), OperationKind::Create);
/// assert_eq!(plan_operation(Some(7), &context, &request, now).kind(), OperationKind::Update);
/// ```
pub fn plan_operation(
    existing: Option<CheckRunId>,
    context: &CheckRunContext,
    request: &CheckRunRequest,
    now: DateTime<Utc>,
) -> CheckRunOperation {
    let mut payload = build_payload(context, request, now);

    match existing {
        Some(id) => CheckRunOperation::Update { id, payload },
        None => {
            payload.head_sha = Some(context.head_sha.clone());
            payload.started_at = Some(request.started_at.unwrap_or(now));
            CheckRunOperation::Create { payload }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> CheckRunContext {
        CheckRunContext::new(
            "owner/repo",
            "29b1a9f",
            "team/service/PR-12",
            "https://ci.example.com/job/service/12/",
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_create_carries_head_sha_and_started_at() {
        let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued);
        let operation = plan_operation(None, &context(), &request, fixed_now());

        match operation {
            CheckRunOperation::Create { payload } => {
                assert_eq!(payload.head_sha.as_deref(), Some("29b1a9f"));
                assert_eq!(payload.started_at, Some(fixed_now()));
                assert_eq!(payload.external_id, "team/service/PR-12");
            }
            other => panic!("expected create, got {:?}", other),
        }
    }

    #[test]
    fn test_create_keeps_requested_started_at() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 11, 58, 0).unwrap();
        let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress).with_started_at(started);
        let operation = plan_operation(None, &context(), &request, fixed_now());

        assert_eq!(operation.payload().started_at, Some(started));
    }

    #[test]
    fn test_update_targets_recorded_id() {
        let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress);
        let operation = plan_operation(Some(4242), &context(), &request, fixed_now());

        match operation {
            CheckRunOperation::Update { id, payload } => {
                assert_eq!(id, 4242);
                assert_eq!(payload.head_sha, None);
                assert_eq!(payload.started_at, None);
                assert_eq!(payload.status, CheckStatus::InProgress);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_details_url_falls_back_to_build_url() {
        let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued);
        let payload = build_payload(&context(), &request, fixed_now());
        assert_eq!(
            payload.details_url.as_deref(),
            Some("https://ci.example.com/job/service/12/")
        );

        let request = request.with_details_url("https://reports.example.com/12");
        let payload = build_payload(&context(), &request, fixed_now());
        assert_eq!(
            payload.details_url.as_deref(),
            Some("https://reports.example.com/12")
        );
    }

    #[test]
    fn test_details_url_omitted_without_build_url() {
        let context = CheckRunContext::new("owner/repo", "29b1a9f", "job", "");
        let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued);
        let payload = build_payload(&context, &request, fixed_now());
        assert_eq!(payload.details_url, None);
    }

    #[test]
    fn test_conclusion_defaults_completed_at_to_now() {
        let request =
            CheckRunRequest::new("Jenkins", CheckStatus::InProgress).completed(CheckConclusion::Success);
        let payload = build_payload(&context(), &request, fixed_now());

        assert_eq!(payload.conclusion, Some(CheckConclusion::Success));
        assert_eq!(payload.completed_at, Some(fixed_now()));
    }

    #[test]
    fn test_conclusion_keeps_requested_completed_at() {
        let finished = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress)
            .completed(CheckConclusion::Failure)
            .with_completed_at(finished);
        let payload = build_payload(&context(), &request, fixed_now());

        assert_eq!(payload.completed_at, Some(finished));
    }

    #[test]
    fn test_no_conclusion_means_no_completed_at() {
        let finished = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let request =
            CheckRunRequest::new("Jenkins", CheckStatus::InProgress).with_completed_at(finished);
        let payload = build_payload(&context(), &request, fixed_now());

        assert_eq!(payload.conclusion, None);
        assert_eq!(payload.completed_at, None);
    }

    #[test]
    fn test_output_and_actions_are_attached_in_order() {
        let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued)
            .with_output(CheckRunOutput::new("Build", "Queued").with_text("waiting for executor"))
            .with_action(CheckRunAction::new("Rerun", "Run again", "rerun"))
            .with_action(CheckRunAction::new("Abort", "Stop the build", "abort"));
        let payload = build_payload(&context(), &request, fixed_now());

        assert_eq!(payload.output.as_ref().map(|o| o.title.as_str()), Some("Build"));
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.actions[0].identifier, "rerun");
        assert_eq!(payload.actions[1].identifier, "abort");
    }

    #[test]
    fn test_payload_serializes_without_empty_fields() {
        let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress);
        let operation = plan_operation(Some(1), &context(), &request, fixed_now());
        let json = serde_json::to_value(operation.payload()).unwrap();

        assert_eq!(json["name"], "Jenkins");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["external_id"], "team/service/PR-12");
        assert!(json.get("head_sha").is_none());
        assert!(json.get("conclusion").is_none());
        assert!(json.get("completed_at").is_none());
        assert!(json.get("actions").is_none());
    }

    #[test]
    fn test_operation_kind_display() {
        assert_eq!(OperationKind::Create.to_string(), "create");
        assert_eq!(OperationKind::Update.to_string(), "update");
    }
}
