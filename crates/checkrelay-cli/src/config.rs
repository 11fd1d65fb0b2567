use checkrelay_core::{CoreError, StatusChecksProperties};
use checkrelay_github::DEFAULT_API_URL;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub github: GithubConfig,
    #[serde(default)]
    pub checks: StatusChecksProperties,
}

/// GitHub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API endpoint used when the credential does not name one
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Credential-specific endpoint, e.g. a GitHub Enterprise server
    #[serde(default)]
    pub credential_api_url: Option<String>,
    /// Organization whose members count as trusted contributors
    pub organization: String,
    #[serde(default)]
    pub token: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. The given file, or checkrelay.toml when present
    /// 3. Environment variables (prefixed with CHECKRELAY_)
    ///
    /// Environment variables use double underscore for nesting:
    /// - CHECKRELAY_GITHUB__TOKEN=ghp_...
    /// - CHECKRELAY_CHECKS__PUBLISH_ORG_PR=true
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with default values
            .set_default("github.api_url", DEFAULT_API_URL)?
            .set_default("github.token", "")?
            .set_default("checks.name", "Jenkins")?
            .set_default("checks.skip", false)?
            .set_default("checks.unstable_build_neutral", false)?
            .set_default("checks.suppress_logs", false)?
            .set_default("checks.skip_progress_updates", false)?
            .set_default("checks.publish_org_pr", false)?
            .set_default("checks.publish_non_org_pr", false)?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None if Path::new("checkrelay.toml").exists() => {
                builder.add_source(File::with_name("checkrelay"))
            }
            None => builder,
        };

        // Override with environment variables
        let builder = builder.add_source(environment);

        builder.build()?.try_deserialize()
    }

    /// Reject settings the publisher cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.github.organization.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "github.organization must not be empty".to_string(),
            ));
        }
        self.checks.validate()
    }
}

/// `CHECKRELAY_` prefix, `__` between nested keys
fn environment() -> Environment {
    Environment::with_prefix("CHECKRELAY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
