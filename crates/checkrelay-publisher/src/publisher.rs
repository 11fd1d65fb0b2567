use checkrelay_core::{CheckRunContext, CheckRunRequest, PublishRecord, StatusChecksProperties};
use checkrelay_github::{ChecksSession, SessionProvider};
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::PublishResult;
use crate::log::{BuildLog, sanitize_log_line};
use crate::membership::MembershipResolver;
use crate::reconciler::{CheckRunReconciler, Reconciled};

/// Settings injected into a [`ChecksPublisher`]
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Organization whose members count as trusted contributors
    pub organization: String,

    pub properties: StatusChecksProperties,
}

impl PublisherConfig {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            properties: StatusChecksProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: StatusChecksProperties) -> Self {
        self.properties = properties;
        self
    }
}

/// Why nothing was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Publishing is switched off for the job
    Disabled,
    /// Only completed checks are published for the job
    ProgressUpdate,
    /// The organization policy excludes this contributor
    Policy,
}

/// What a publish call did
///
/// Failures are reported here rather than returned as errors: a check run
/// that cannot be published never fails the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(Reconciled),
    Skipped(SkipReason),
    Failed(String),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

/// Publishes check runs for one build
pub struct ChecksPublisher<P: SessionProvider> {
    provider: P,
    resolver: MembershipResolver,
    reconciler: CheckRunReconciler,
    properties: StatusChecksProperties,
}

impl<P: SessionProvider> ChecksPublisher<P> {
    pub fn new(provider: P, config: PublisherConfig) -> Self {
        Self {
            provider,
            resolver: MembershipResolver::new(config.organization),
            reconciler: CheckRunReconciler::new(),
            properties: config.properties,
        }
    }

    pub fn properties(&self) -> &StatusChecksProperties {
        &self.properties
    }

    /// Publish one status transition of the build
    pub async fn publish(
        &self,
        context: &CheckRunContext,
        record: &mut dyn PublishRecord,
        log: &mut dyn BuildLog,
        request: CheckRunRequest,
    ) -> PublishOutcome {
        if self.properties.skip {
            debug!("Status checks are disabled for job {}", sanitize_log_line(&context.job_name));
            return PublishOutcome::Skipped(SkipReason::Disabled);
        }

        if !self.properties.publishes_status(request.status) {
            debug!(
                "Skipping {} update for job {}",
                request.status,
                sanitize_log_line(&context.job_name)
            );
            return PublishOutcome::Skipped(SkipReason::ProgressUpdate);
        }

        let request = self.properties.apply(request);

        match self.try_publish(context, record, log, &request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = "Failed Publishing GitHub checks: ";
                warn!(
                    "{}",
                    sanitize_log_line(&format!(
                        "{}repository: {}, sha: {}, job name: {}, name: {}, status: {}: {}",
                        message,
                        context.repository,
                        context.head_sha,
                        context.job_name,
                        request.name,
                        request.status,
                        e
                    ))
                );
                log.log(&format!("{}{}", message, e));
                PublishOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_publish(
        &self,
        context: &CheckRunContext,
        record: &mut dyn PublishRecord,
        log: &mut dyn BuildLog,
        request: &CheckRunRequest,
    ) -> PublishResult<PublishOutcome> {
        request.validate()?;

        let session = self.provider.connect().await?;

        if let Some(contributor) = &context.contributor {
            log.log(&format!("contributor name is {}", contributor));

            if !self.contributor_allowed(&session, context, contributor, log).await? {
                return Ok(PublishOutcome::Skipped(SkipReason::Policy));
            }
        }

        let reconciled = self
            .reconciler
            .reconcile(&session, context, record, request, Utc::now())
            .await?;

        log.log(&format!(
            "GitHub check (name: {}, status: {}) has been published.",
            request.name, request.status
        ));
        debug!(
            "{}",
            sanitize_log_line(&format!(
                "Published check for repo: {}, sha: {}, job name: {}, name: {}, status: {}",
                context.repository, context.head_sha, context.job_name, request.name, request.status
            ))
        );

        Ok(PublishOutcome::Published(reconciled))
    }

    /// Apply the organization policy to a pull request author
    async fn contributor_allowed(
        &self,
        session: &P::Session,
        context: &CheckRunContext,
        contributor: &str,
        log: &mut dyn BuildLog,
    ) -> PublishResult<bool> {
        let is_private = session.is_private(&context.repository).await?;
        let policy = self.properties.policy;

        log.log(&format!("publish_non_org_pr is {}", policy.publish_non_org_pr));
        log.log(&format!("publish_org_pr is {}", policy.publish_org_pr));

        let is_member = self
            .resolver
            .is_org_member(session, contributor, is_private, log)
            .await;
        let should_publish = policy.should_publish(is_private, is_member);

        log.log(&format!("publish github status : {}", should_publish));
        Ok(should_publish)
    }
}
