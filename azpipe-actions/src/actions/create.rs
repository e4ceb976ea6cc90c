//! `azure:pipeline:create`

use async_trait::async_trait;
use azpipe_client::PipelinesApi;
use azpipe_core::domain::ProjectRef;
use azpipe_core::domain::pipeline::{CreatedPipeline, PipelineDefinition};
use azpipe_core::dto::pipeline::CreatePipelineRequest;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::info;

use super::log_remote_failure;
use crate::action::{ActionEnv, TemplateAction};
use crate::context::ActionContext;
use crate::error::{ActionError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePipelineInput {
    create_api_version: Option<String>,
    server: Option<String>,
    organization: String,
    project: String,
    folder: String,
    name: String,
    repository_id: String,
    repository_name: String,
    yaml_path: Option<String>,
    token: Option<String>,
}

/// Creates a pipeline and maps the response to its id and web URL
///
/// # Errors
/// [`ActionError::RemoteRequest`] on a non-success response and
/// [`ActionError::MalformedResponse`] when the response has no web link.
pub async fn create_pipeline(
    api: &dyn PipelinesApi,
    project: &ProjectRef,
    definition: &PipelineDefinition,
) -> Result<CreatedPipeline> {
    let response = api
        .create_pipeline(project, &CreatePipelineRequest::from(definition))
        .await?;

    let web_url = response
        .links
        .web_href()
        .ok_or_else(|| {
            ActionError::MalformedResponse(format!("pipeline {} has no web link", response.id))
        })?
        .to_string();

    Ok(CreatedPipeline {
        id: response.id,
        web_url,
    })
}

/// Creates a YAML pipeline bound to an Azure Repos repository
///
/// Outputs `pipelineId` and `pipelineUrl` on success.
pub struct CreatePipelineAction {
    env: ActionEnv,
}

impl CreatePipelineAction {
    pub const ID: &'static str = "azure:pipeline:create";

    pub fn new(env: ActionEnv) -> Self {
        Self { env }
    }
}

#[async_trait]
impl TemplateAction for CreatePipelineAction {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn description(&self) -> &'static str {
        "Creates an Azure DevOps pipeline from a YAML definition in a repository"
    }

    fn schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "required": ["organization", "project", "folder", "name", "repositoryId", "repositoryName"],
            "properties": {
                "createApiVersion": {
                    "type": "string",
                    "title": "Create API version",
                    "description": "The Azure Create Pipeline API version to use. Defaults to 6.1-preview.1"
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
                "folder": {
                    "type": "string",
                    "title": "Folder",
                    "description": "The name of the folder of the pipeline."
                },
                "name": {
                    "type": "string",
                    "title": "Name",
                    "description": "The name of the pipeline."
                },
                "repositoryId": {
                    "type": "string",
                    "title": "Repository ID",
                    "description": "The ID of the repository."
                },
                "repositoryName": {
                    "type": "string",
                    "title": "Repository Name",
                    "description": "The name of the repository."
                },
                "yamlPath": {
                    "type": "string",
                    "title": "Azure DevOps Pipelines Definition",
                    "description": "The location of the Azure DevOps Pipeline definition file. Defaults to /azure-pipelines.yaml"
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
        let input: CreatePipelineInput = ctx.input()?;

        let mut versions = self.env.config.api_versions.clone();
        if let Some(version) = input.create_api_version {
            versions.create = version;
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

        info!(
            "Creating an Azure pipeline for the repository {} with the ID {}.",
            input.repository_name, input.repository_id
        );

        let project = ProjectRef::new(input.organization, input.project);
        let definition = PipelineDefinition {
            folder: input.folder,
            name: input.name,
            repository_id: input.repository_id,
            repository_name: input.repository_name,
            yaml_path: input.yaml_path,
        };

        match create_pipeline(api.as_ref(), &project, &definition).await {
            Ok(created) => {
                info!(
                    "Successfully created {} Azure pipeline in {}.",
                    definition.name, definition.folder
                );
                info!("The Azure pipeline ID is {}.", created.id);
                ctx.output("pipelineId", created.id.to_string());
                ctx.output("pipelineUrl", created.web_url);
            }
            Err(e) => log_remote_failure("create Azure pipeline", &e),
        }

        Ok(())
    }
}
