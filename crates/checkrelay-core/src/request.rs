use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Identifier GitHub assigns to a check run
pub type CheckRunId = u64;

/// Maximum number of characters GitHub accepts in an output summary or text
pub const MAX_OUTPUT_LENGTH: usize = 65_535;

const TRUNCATION_MARKER: &str = "\nOutput truncated.";

/// Lifecycle status of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Queued,
    InProgress,
    Completed,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(Self::Queued),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

/// Final result of a completed check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    ActionRequired,
    Cancelled,
    Failure,
    Neutral,
    Success,
    Skipped,
    Stale,
    TimedOut,
}

impl CheckConclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActionRequired => "action_required",
            Self::Cancelled => "cancelled",
            Self::Failure => "failure",
            Self::Neutral => "neutral",
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Stale => "stale",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for CheckConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckConclusion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "action_required" => Ok(Self::ActionRequired),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "failure" => Ok(Self::Failure),
            "neutral" => Ok(Self::Neutral),
            "success" => Ok(Self::Success),
            "skipped" => Ok(Self::Skipped),
            "stale" => Ok(Self::Stale),
            "timed_out" => Ok(Self::TimedOut),
            _ => Err(CoreError::InvalidConclusion(s.to_string())),
        }
    }
}

/// Output block rendered on the check run page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CheckRunOutput {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Clamp summary and text to the size GitHub accepts
    pub fn truncated(mut self) -> Self {
        self.summary = truncate_output(self.summary);
        self.text = self.text.map(truncate_output);
        self
    }
}

fn truncate_output(value: String) -> String {
    if value.chars().count() <= MAX_OUTPUT_LENGTH {
        return value;
    }

    let keep = MAX_OUTPUT_LENGTH - TRUNCATION_MARKER.chars().count();
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Button offered on the check run page that triggers a follow-up event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunAction {
    pub label: String,
    pub description: String,
    pub identifier: String,
}

impl CheckRunAction {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            identifier: identifier.into(),
        }
    }
}

/// A check run as the build wants it to appear on GitHub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRunRequest {
    /// Check name, unique within a build
    pub name: String,

    pub status: CheckStatus,

    /// Required when `status` is `Completed`
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,

    #[serde(default)]
    pub output: Option<CheckRunOutput>,

    /// Rendered in order
    #[serde(default)]
    pub actions: Vec<CheckRunAction>,

    #[serde(default)]
    pub details_url: Option<String>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRunRequest {
    pub fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            conclusion: None,
            output: None,
            actions: Vec::new(),
            details_url: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Mark the run completed with the given conclusion
    pub fn completed(mut self, conclusion: CheckConclusion) -> Self {
        self.status = CheckStatus::Completed;
        self.conclusion = Some(conclusion);
        self
    }

    pub fn with_output(mut self, output: CheckRunOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_action(mut self, action: CheckRunAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_details_url(mut self, url: impl Into<String>) -> Self {
        self.details_url = Some(url.into());
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Check the request is something GitHub will accept
    ///
    /// A conclusion must accompany exactly the `completed` status.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "check name must not be blank".to_string(),
            ));
        }

        match (self.status, self.conclusion) {
            (CheckStatus::Completed, None) => Err(CoreError::InvalidRequest(format!(
                "check '{}' is completed but has no conclusion",
                self.name
            ))),
            (status, Some(conclusion)) if status != CheckStatus::Completed => {
                Err(CoreError::InvalidRequest(format!(
                    "check '{}' has conclusion {} but status {}",
                    self.name, conclusion, status
                )))
            }
            _ => Ok(()),
        }
    }
}
