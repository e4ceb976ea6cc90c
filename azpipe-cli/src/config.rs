//! Configuration module
//!
//! Builds the action environment from the environment variables, the
//! integrations file and the command-line token.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use azpipe_actions::{ActionConfig, ActionEnv, ActionRegistry, IntegrationRegistry};
use tracing::{info, warn};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Defaults shared by every action
    pub actions: ActionConfig,

    /// Credentials per Azure DevOps host
    pub integrations: IntegrationRegistry,
}

impl Config {
    /// Loads the configuration
    ///
    /// # Arguments
    /// * `integrations` - Optional path to a TOML integrations file
    /// * `token` - Personal access token registered for the default host
    pub fn load(integrations: Option<PathBuf>, token: Option<String>) -> Result<Self> {
        let actions = ActionConfig::from_env();
        actions.validate().context("Invalid action configuration")?;

        let mut registry = match integrations {
            Some(path) => {
                info!("Loading integrations from {}", path.display());
                IntegrationRegistry::from_file(&path).context("Failed to load integrations")?
            }
            None => IntegrationRegistry::new(),
        };

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            registry = registry.with_token(actions.default_host.clone(), token);
        }

        if registry.is_empty() {
            warn!("No Azure DevOps credentials configured; pass --token or --integrations");
        }

        Ok(Self {
            actions,
            integrations: registry,
        })
    }

    /// Registry of the default actions wired to HTTP
    pub fn registry(&self) -> ActionRegistry {
        let env = ActionEnv::new(self.actions.clone(), Arc::new(self.integrations.clone()));
        ActionRegistry::with_defaults(env)
    }
}
