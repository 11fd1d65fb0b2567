use checkrelay_core::{
    CheckRunContext, CheckRunId, CheckRunOperation, CheckRunRequest, CheckStatus, OperationKind,
    PublishRecord, plan_operation,
};
use checkrelay_github::ChecksSession;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::PublishResult;
use crate::log::sanitize_log_line;

/// Result of a successful create or update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub id: CheckRunId,
    pub kind: OperationKind,
    pub status: CheckStatus,
}

/// Creates a check run the first time a name is published in a build and
/// updates it afterwards
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckRunReconciler;

impl CheckRunReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Send `request` and remember the resulting id under its name
    pub async fn reconcile<S>(
        &self,
        session: &S,
        context: &CheckRunContext,
        record: &mut dyn PublishRecord,
        request: &CheckRunRequest,
        now: DateTime<Utc>,
    ) -> PublishResult<Reconciled>
    where
        S: ChecksSession + ?Sized,
    {
        let existing = record.get_id(&request.name);
        let operation = plan_operation(existing, context, request, now);
        let kind = operation.kind();

        debug!(
            "{}",
            sanitize_log_line(&format!(
                "Reconciling check {} in {} as {}",
                request.name, context.repository, kind
            ))
        );

        let run = match &operation {
            CheckRunOperation::Create { payload } => {
                session.create_check_run(&context.repository, payload).await?
            }
            CheckRunOperation::Update { id, payload } => {
                session
                    .update_check_run(&context.repository, *id, payload)
                    .await?
            }
        };

        record.add_if_missing(&request.name, run.id)?;

        Ok(Reconciled {
            id: run.id,
            kind,
            status: request.status,
        })
    }
}
