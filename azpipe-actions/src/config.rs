//! Action configuration
//!
//! Defines the defaults every template action falls back to when its input
//! leaves a setting out: the Azure DevOps host, the API version of each
//! endpoint, the default branch and the run polling behavior.

use std::time::Duration;

use azpipe_client::{ApiVersions, DEFAULT_HOST};

use crate::error::{ActionError, Result};

/// Action configuration
///
/// Intervals and timeouts are configurable so the same actions work against
/// fast private agents and slow shared pools alike.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// Azure DevOps host used when an action input has no `server`
    pub default_host: String,

    /// API version per endpoint
    pub api_versions: ApiVersions,

    /// Delay between two status polls of a run
    pub poll_interval: Duration,

    /// Maximum time to wait for a run to complete; `None` waits indefinitely
    pub run_timeout: Option<Duration>,

    /// Branch a run targets when the input names none
    pub default_branch: String,
}

impl ActionConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            api_versions: ApiVersions::default(),
            poll_interval: Duration::from_secs(10),
            run_timeout: None,
            default_branch: "main".to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - AZDO_HOST (default: dev.azure.com)
    /// - AZDO_CREATE_API_VERSION (default: 6.1-preview.1)
    /// - AZDO_PERMITS_API_VERSION (default: 7.1-preview.1)
    /// - AZDO_RUN_API_VERSION (default: 7.0)
    /// - AZDO_BUILD_API_VERSION (default: 6.1-preview.6)
    /// - AZDO_POLL_INTERVAL (seconds, default: 10)
    /// - AZDO_RUN_TIMEOUT (seconds, default: none)
    /// - AZDO_DEFAULT_BRANCH (default: main)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    ///
    /// Unparseable numbers fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new();
        let string = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };
        let seconds = |key: &str| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        Self {
            default_host: string("AZDO_HOST", defaults.default_host),
            api_versions: ApiVersions {
                create: string("AZDO_CREATE_API_VERSION", defaults.api_versions.create),
                permits: string("AZDO_PERMITS_API_VERSION", defaults.api_versions.permits),
                run: string("AZDO_RUN_API_VERSION", defaults.api_versions.run),
                build: string("AZDO_BUILD_API_VERSION", defaults.api_versions.build),
            },
            poll_interval: seconds("AZDO_POLL_INTERVAL").unwrap_or(defaults.poll_interval),
            run_timeout: seconds("AZDO_RUN_TIMEOUT").or(defaults.run_timeout),
            default_branch: string("AZDO_DEFAULT_BRANCH", defaults.default_branch),
        }
    }

    /// Sets the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the run timeout
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Sets the default host
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_host.trim().is_empty() {
            return Err(ActionError::Configuration(
                "default_host cannot be empty".to_string(),
            ));
        }

        if self.default_branch.trim().is_empty() {
            return Err(ActionError::Configuration(
                "default_branch cannot be empty".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(ActionError::Configuration(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.run_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ActionError::Configuration(
                "run_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self::new()
    }
}
