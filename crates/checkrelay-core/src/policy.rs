use serde::{Deserialize, Serialize};

/// Which pull request authors get status checks on public repositories
///
/// With both flags unset no restriction applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Publish for pull requests opened by organization members
    #[serde(default)]
    pub publish_org_pr: bool,

    /// Publish for pull requests opened by non-members
    #[serde(default)]
    pub publish_non_org_pr: bool,
}

impl PolicyConfig {
    pub fn new(publish_org_pr: bool, publish_non_org_pr: bool) -> Self {
        Self {
            publish_org_pr,
            publish_non_org_pr,
        }
    }

    /// True when neither flag is set
    pub fn is_unrestricted(&self) -> bool {
        !self.publish_org_pr && !self.publish_non_org_pr
    }

    /// True when both flags are set, which admits every contributor
    pub fn admits_everyone(&self) -> bool {
        self.publish_org_pr && self.publish_non_org_pr
    }

    /// Apply [`should_publish`] with this configuration
    pub fn should_publish(&self, is_private: bool, is_org_member: bool) -> bool {
        should_publish(
            is_private,
            is_org_member,
            self.publish_non_org_pr,
            self.publish_org_pr,
        )
    }
}

/// Decide whether a status check should be sent at all
///
/// Private repositories always publish. On public repositories an
/// unconfigured policy publishes; otherwise the contributor's membership
/// must match one of the enabled flags.
///
/// # Examples
///
/// ```
/// use checkrelay_core::policy::should_publish;
///
/// assert!(should_publish(true, true, false, true));     // private repo
/// assert!(!should_publish(false, true, true, false));   // member, non-member PRs only
/// assert!(!should_publish(false, false, false, true));  // non-member, member PRs only
/// assert!(should_publish(false, false, true, false));   // non-member, non-member PRs only
/// assert!(should_publish(false, true, false, true));    // member, member PRs only
/// assert!(should_publish(false, false, false, false));  // nothing configured
/// ```
pub fn should_publish(
    is_private: bool,
    is_org_member: bool,
    publish_non_org_only: bool,
    publish_org_only: bool,
) -> bool {
    if is_private {
        return true;
    }

    if !publish_org_only && !publish_non_org_only {
        return true;
    }

    (is_org_member && publish_org_only) || (!is_org_member && publish_non_org_only)
}
