//! `azure:pipeline:permit`

use async_trait::async_trait;
use azpipe_client::PipelinesApi;
use azpipe_core::domain::ProjectRef;
use azpipe_core::domain::permission::AuthorizationRequest;
use azpipe_core::dto::permission::PipelinePermissionsUpdate;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::info;

use super::{log_remote_failure, numeric_id};
use crate::action::{ActionEnv, TemplateAction};
use crate::context::ActionContext;
use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermitPipelineInput {
    permits_api_version: Option<String>,
    server: Option<String>,
    organization: String,
    project: String,
    resource_id: String,
    resource_type: String,
    authorized: bool,
    #[serde(deserialize_with = "numeric_id")]
    pipeline_id: u64,
    token: Option<String>,
}

/// Sends one authorization update for a resource/pipeline pair
pub async fn set_pipeline_permission(
    api: &dyn PipelinesApi,
    project: &ProjectRef,
    request: &AuthorizationRequest,
) -> Result<()> {
    api.update_pipeline_permissions(
        project,
        &request.resource_type,
        &request.resource_id,
        &PipelinePermissionsUpdate::from(request),
    )
    .await?;
    Ok(())
}

/// Grants or revokes a pipeline's access to a protected resource
pub struct PermitPipelineAction {
    env: ActionEnv,
}

impl PermitPipelineAction {
    pub const ID: &'static str = "azure:pipeline:permit";

    pub fn new(env: ActionEnv) -> Self {
        Self { env }
    }
}

#[async_trait]
impl TemplateAction for PermitPipelineAction {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn description(&self) -> &'static str {
        "Authorizes or unauthorizes an Azure DevOps pipeline for a protected resource"
    }

    fn schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "required": ["organization", "project", "resourceId", "resourceType", "authorized", "pipelineId"],
            "properties": {
                "permitsApiVersion": {
                    "type": "string",
                    "title": "Permits API version",
                    "description": "The Azure Permits Pipeline API version to use. Defaults to 7.1-preview.1"
                },
                "server": {
                    "type": "string",
                    "title": "Host",
                    "description": "The host of Azure DevOps. Defaults to dev.azure.com"
                },
                "organization": {
                    "type": "string",
                    "title": "Organization",
                    "description": "The name of the Azure DevOps organization."
                },
                "project": {
                    "type": "string",
                    "title": "Project",
                    "description": "The name of the Azure project."
                },
                "resourceId": {
                    "type": "string",
                    "title": "Resource ID",
                    "description": "The resource ID."
                },
                "resourceType": {
                    "type": "string",
                    "title": "Resource Type",
                    "description": "The type of the resource (e.g. endpoint)."
                },
                "authorized": {
                    "type": "boolean",
                    "title": "Authorized",
                    "description": "A true or false authorization indicator."
                },
                "pipelineId": {
                    "type": "string",
                    "title": "Pipeline ID",
                    "description": "The pipeline ID."
                },
                "token": {
                    "type": "string",
                    "title": "Token",
                    "description": "Personal access token overriding the configured integration."
                }
            }
        })
    }

    async fn handle(&self, ctx: &mut ActionContext) -> Result<()> {
        let input: PermitPipelineInput = ctx.input()?;

        let mut versions = self.env.config.api_versions.clone();
        if let Some(version) = input.permits_api_version {
            versions.permits = version;
        }

        let api = self
            .env
            .connect(
                input.server.as_deref(),
                &input.organization,
                input.token,
                versions,
            )
            .await?;

        let request = AuthorizationRequest {
            resource_type: input.resource_type,
            resource_id: input.resource_id,
            pipeline_id: input.pipeline_id,
            authorized: input.authorized,
        };
        info!(
            "{} Azure pipeline with ID {} for {} with ID {}.",
            request.verb(),
            request.pipeline_id,
            request.resource_type,
            request.resource_id
        );

        let project = ProjectRef::new(input.organization, input.project);
        match set_pipeline_permission(api.as_ref(), &project, &request).await {
            Ok(()) => info!("Successfully changed the Azure pipeline permissions."),
            Err(e) => log_remote_failure("change the Azure pipeline permissions", &e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::test_support::{FakeApi, FakeConnector, fake_env};
    use std::sync::Arc;

    fn input(authorized: bool) -> JsonValue {
        json!({
            "organization": "contoso",
            "project": "platform",
            "resourceId": "a3f1",
            "resourceType": "endpoint",
            "authorized": authorized,
            "pipelineId": "17"
        })
    }

    #[tokio::test]
    async fn test_permit_sends_patch_body() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let action = PermitPipelineAction::new(fake_env(connector.clone()));
        let mut ctx = ActionContext::new(input(true));

        action.handle(&mut ctx).await.unwrap();

        let permits = connector.api.permits.lock().unwrap();
        let (resource_type, resource_id, body) = &permits[0];
        assert_eq!(resource_type, "endpoint");
        assert_eq!(resource_id, "a3f1");
        assert_eq!(body.pipelines.len(), 1);
        assert!(body.pipelines[0].authorized);
        assert_eq!(body.pipelines[0].id, 17);
        assert!(ctx.outputs().is_empty());
    }

    #[tokio::test]
    async fn test_permit_twice_sends_identical_requests() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let action = PermitPipelineAction::new(fake_env(connector.clone()));

        for _ in 0..2 {
            let mut ctx = ActionContext::new(input(false));
            action.handle(&mut ctx).await.unwrap();
        }

        let permits = connector.api.permits.lock().unwrap();
        assert_eq!(permits.len(), 2);
        assert_eq!(permits[0], permits[1]);
        assert!(!permits[0].2.pipelines[0].authorized);
    }

    #[tokio::test]
    async fn test_permit_failure_is_logged_not_raised() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new().with_permit_status(403)));
        let action = PermitPipelineAction::new(fake_env(connector.clone()));
        let mut ctx = ActionContext::new(input(true));

        assert!(action.handle(&mut ctx).await.is_ok());
        assert_eq!(connector.api.permits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_pipeline_id_is_invalid_input() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let action = PermitPipelineAction::new(fake_env(connector.clone()));
        let mut payload = input(true);
        payload["pipelineId"] = json!("svc-build");
        let mut ctx = ActionContext::new(payload);

        let err = action.handle(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput(_)));
        assert!(connector.api.permits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_token_skips_registry() {
        let connector = Arc::new(FakeConnector::new(FakeApi::new()));
        let action = PermitPipelineAction::new(fake_env(connector.clone()));
        let mut payload = input(true);
        payload["server"] = json!("tfs.fabrikam.com");
        payload["token"] = json!("input-pat");
        let mut ctx = ActionContext::new(payload);

        action.handle(&mut ctx).await.unwrap();

        let connections = connector.connections.lock().unwrap();
        assert_eq!(connections[0].0, "tfs.fabrikam.com");
        assert_eq!(connections[0].1, "input-pat");
    }
}
