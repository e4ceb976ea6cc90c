//! Credential resolution
//!
//! Maps a target host and organization to a personal access token. The
//! registry mirrors the portal's `integrations.azure` configuration: one entry
//! per host, each with a list of credentials that are either scoped to named
//! organizations or act as the host default.

use std::path::Path;

use async_trait::async_trait;
use azpipe_client::authority_for;
use serde::Deserialize;

use crate::error::{ActionError, Result};

/// Resolves the token used to talk to an Azure DevOps organization
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Returns the token for `organization` on `host`
    ///
    /// `host` is matched by authority, so a scheme or a path on either side
    /// is ignored.
    ///
    /// # Errors
    /// [`ActionError::Configuration`] when no integration matches the host
    /// or the matching integration has no usable token.
    async fn resolve_token(&self, host: &str, organization: &str) -> Result<String>;
}

/// Integrations file layout
///
/// ```toml
/// [[azure]]
/// host = "dev.azure.com"
///
/// [[azure.credentials]]
/// organizations = ["contoso"]
/// personal_access_token = "..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationsFile {
    #[serde(default)]
    pub azure: Vec<AzureIntegration>,
}

/// Integration for one Azure DevOps host
#[derive(Debug, Clone, Deserialize)]
pub struct AzureIntegration {
    pub host: String,
    /// Host-wide token, consulted after `credentials`
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub credentials: Vec<AzureCredential>,
}

/// One personal access token and the organizations it applies to
#[derive(Debug, Clone, Deserialize)]
pub struct AzureCredential {
    /// Organizations this token is limited to; absent or empty means any
    #[serde(default)]
    pub organizations: Option<Vec<String>>,
    #[serde(default, alias = "personalAccessToken")]
    pub personal_access_token: Option<String>,
}

impl AzureCredential {
    fn token(&self) -> Option<&str> {
        self.personal_access_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    fn is_default(&self) -> bool {
        self.organizations
            .as_ref()
            .is_none_or(|organizations| organizations.is_empty())
    }

    fn covers(&self, organization: &str) -> bool {
        self.organizations.as_ref().is_some_and(|organizations| {
            organizations
                .iter()
                .any(|o| o.eq_ignore_ascii_case(organization))
        })
    }
}

/// Host-integration registry backed by static configuration
#[derive(Debug, Clone, Default)]
pub struct IntegrationRegistry {
    integrations: Vec<AzureIntegration>,
}

impl IntegrationRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an integrations file
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: IntegrationsFile = toml::from_str(source).map_err(|e| {
            ActionError::Configuration(format!("Failed to parse integrations: {}", e))
        })?;
        Ok(Self {
            integrations: file.azure,
        })
    }

    /// Loads an integrations file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ActionError::Configuration(format!(
                "Failed to read integrations file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&source)
    }

    /// Adds a host-wide default token
    pub fn with_token(mut self, host: impl Into<String>, token: impl Into<String>) -> Self {
        let host = host.into();
        let credential = AzureCredential {
            organizations: None,
            personal_access_token: Some(token.into()),
        };
        match self
            .integrations
            .iter_mut()
            .find(|i| authority_for(&i.host).eq_ignore_ascii_case(&authority_for(&host)))
        {
            Some(integration) => integration.credentials.push(credential),
            None => self.integrations.push(AzureIntegration {
                host,
                token: None,
                credentials: vec![credential],
            }),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    /// Hosts with a configured integration
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.integrations.iter().map(|i| i.host.as_str())
    }

    fn lookup(&self, host: &str, organization: &str) -> Result<String> {
        let authority = authority_for(host);
        let integration = self
            .integrations
            .iter()
            .find(|i| authority_for(&i.host).eq_ignore_ascii_case(&authority))
            .ok_or_else(|| {
                ActionError::Configuration(format!(
                    "No matching integration configuration for host {}, please check your integrations config",
                    host
                ))
            })?;

        let scoped = integration
            .credentials
            .iter()
            .filter(|c| c.covers(organization))
            .find_map(AzureCredential::token);
        let default = || {
            integration
                .credentials
                .iter()
                .filter(|c| c.is_default())
                .find_map(AzureCredential::token)
        };
        let host_wide = || integration.token.as_deref().filter(|t| !t.is_empty());

        scoped
            .or_else(default)
            .or_else(host_wide)
            .map(str::to_string)
            .ok_or_else(|| {
                ActionError::Configuration(format!(
                    "No token available for host: {}, with organization {}",
                    host, organization
                ))
            })
    }
}

#[async_trait]
impl TokenResolver for IntegrationRegistry {
    async fn resolve_token(&self, host: &str, organization: &str) -> Result<String> {
        self.lookup(host, organization)
    }
}
