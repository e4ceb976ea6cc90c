//! Template action abstraction
//!
//! A template action is a named unit of work a scaffolding template can
//! invoke. Actions share an [`ActionEnv`] holding configuration, the
//! credential resolver and the connector used to reach Azure DevOps.

use std::sync::Arc;

use async_trait::async_trait;
use azpipe_client::{ApiVersions, PipelinesApi, authority_for};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::ActionConfig;
use crate::connector::{Connector, HttpConnector};
use crate::context::ActionContext;
use crate::credentials::TokenResolver;
use crate::error::Result;

/// A named, schema-described action invocable from a template
#[async_trait]
pub trait TemplateAction: Send + Sync {
    /// Identifier templates use to invoke the action (e.g. `azure:pipeline:run`)
    fn id(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// JSON schema of the action input
    fn schema(&self) -> JsonValue;

    /// Runs the action
    ///
    /// # Errors
    /// Only errors detected before any network call are returned; remote
    /// failures are logged and the action completes.
    async fn handle(&self, ctx: &mut ActionContext) -> Result<()>;
}

/// Collaborators shared by all actions
#[derive(Clone)]
pub struct ActionEnv {
    pub config: Arc<ActionConfig>,
    pub resolver: Arc<dyn TokenResolver>,
    pub connector: Arc<dyn Connector>,
}

impl ActionEnv {
    /// Creates an environment that talks HTTP
    pub fn new(config: ActionConfig, resolver: Arc<dyn TokenResolver>) -> Self {
        Self::with_connector(config, resolver, Arc::new(HttpConnector::new()))
    }

    pub fn with_connector(
        config: ActionConfig,
        resolver: Arc<dyn TokenResolver>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
            connector,
        }
    }

    /// Resolves credentials and builds the API handle for one invocation
    ///
    /// An explicit token from the action input takes precedence over the
    /// resolver. The returned handle keeps that token for every call.
    ///
    /// # Arguments
    /// * `server` - Host from the action input, defaulting to the configured
    ///   host; may carry a scheme and a collection path
    /// * `organization` - Azure DevOps organization
    /// * `explicit_token` - Token supplied in the action input
    /// * `versions` - API versions for this invocation
    pub async fn connect(
        &self,
        server: Option<&str>,
        organization: &str,
        explicit_token: Option<String>,
        versions: ApiVersions,
    ) -> Result<Arc<dyn PipelinesApi>> {
        let host = server
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.config.default_host);

        let token = match explicit_token.filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                let authority = authority_for(host);
                debug!(
                    "Resolving credentials for organization {} on {}",
                    organization, authority
                );
                self.resolver.resolve_token(&authority, organization).await?
            }
        };

        self.connector.connect(host, token, versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IntegrationRegistry;
    use crate::test_support::{FakeApi, FakeConnector};

    fn env(connector: Arc<FakeConnector>) -> ActionEnv {
        let registry = IntegrationRegistry::from_toml_str(
            r#"
            [[azure]]
            host = "tfs.fabrikam.com"

            [[azure.credentials]]
            organizations = ["contoso"]
            personal_access_token = "contoso-pat"
            "#,
        )
        .unwrap();
        ActionEnv::with_connector(ActionConfig::default(), Arc::new(registry), connector)
    }

    #[tokio::test]
    async fn test_server_with_scheme_finds_host_credentials() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let env = env(connector.clone());

        env.connect(Some("https://tfs.fabrikam.com"), "contoso", None, ApiVersions::default())
            .await
            .unwrap();

        let connections = connector.connections.lock().unwrap();
        assert_eq!(connections[0].0, "https://tfs.fabrikam.com");
        assert_eq!(connections[0].1, "contoso-pat");
    }

    #[tokio::test]
    async fn test_server_with_collection_path_uses_organization_input() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let env = env(connector.clone());

        env.connect(Some("tfs.fabrikam.com/tfs"), "contoso", None, ApiVersions::default())
            .await
            .unwrap();

        let connections = connector.connections.lock().unwrap();
        assert_eq!(connections[0].0, "tfs.fabrikam.com/tfs");
        assert_eq!(connections[0].1, "contoso-pat");
    }

    #[tokio::test]
    async fn test_unscoped_organization_has_no_token() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let env = env(connector.clone());

        let err = env
            .connect(Some("tfs.fabrikam.com/tfs"), "northwind", None, ApiVersions::default())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, crate::error::ActionError::Configuration(_)));
        assert!(connector.connections.lock().unwrap().is_empty());
    }
}
