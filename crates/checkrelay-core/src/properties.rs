use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::policy::PolicyConfig;
use crate::request::{CheckConclusion, CheckRunOutput, CheckRunRequest, CheckStatus};

/// Outcome of the build a check run reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Unstable => "unstable",
            Self::Failure => "failure",
            Self::NotBuilt => "not_built",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

impl FromStr for BuildResult {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "success" => Ok(Self::Success),
            "unstable" => Ok(Self::Unstable),
            "failure" => Ok(Self::Failure),
            "not_built" => Ok(Self::NotBuilt),
            "aborted" => Ok(Self::Aborted),
            _ => Err(CoreError::InvalidBuildResult(s.to_string())),
        }
    }
}

/// Per-job settings controlling how status checks are published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChecksProperties {
    /// Check name used when a request does not pick one
    #[serde(default = "default_name")]
    pub name: String,

    /// Do not publish anything
    #[serde(default)]
    pub skip: bool,

    /// Report unstable builds as neutral rather than failed
    #[serde(default)]
    pub unstable_build_neutral: bool,

    /// Drop the detailed output text before publishing
    #[serde(default)]
    pub suppress_logs: bool,

    /// Only publish completed checks
    #[serde(default)]
    pub skip_progress_updates: bool,

    /// Organization membership policy for public repositories
    #[serde(flatten)]
    pub policy: PolicyConfig,
}

fn default_name() -> String {
    "Jenkins".to_string()
}

impl Default for StatusChecksProperties {
    fn default() -> Self {
        Self {
            name: default_name(),
            skip: false,
            unstable_build_neutral: false,
            suppress_logs: false,
            skip_progress_updates: false,
            policy: PolicyConfig::default(),
        }
    }
}

impl StatusChecksProperties {
    /// Reject unusable settings
    ///
    /// Enabling both policy flags is accepted but logged, since it admits
    /// every contributor exactly like leaving both unset.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "Name should not be empty!".to_string(),
            ));
        }

        if self.policy.admits_everyone() {
            warn!(
                "Both publish_org_pr and publish_non_org_pr are enabled for check '{}'; checks are published for every contributor",
                self.name
            );
        }

        Ok(())
    }

    /// Conclusion reported for a finished build
    pub fn conclusion_for(&self, result: BuildResult) -> CheckConclusion {
        match result {
            BuildResult::Success => CheckConclusion::Success,
            BuildResult::Unstable if self.unstable_build_neutral => CheckConclusion::Neutral,
            BuildResult::Unstable | BuildResult::Failure => CheckConclusion::Failure,
            BuildResult::NotBuilt => CheckConclusion::Skipped,
            BuildResult::Aborted => CheckConclusion::Cancelled,
        }
    }

    /// Whether a check in `status` should be sent at all
    pub fn publishes_status(&self, status: CheckStatus) -> bool {
        !self.skip_progress_updates || status == CheckStatus::Completed
    }

    /// Apply output-related settings to a request
    pub fn apply(&self, mut request: CheckRunRequest) -> CheckRunRequest {
        if self.suppress_logs {
            request.output = request.output.map(|output| CheckRunOutput {
                text: None,
                ..output
            });
        }
        request
    }
}
