//! Pipeline-related API endpoints

use crate::AzureDevOpsClient;
use crate::error::Result;
use azpipe_core::domain::ProjectRef;
use azpipe_core::dto::permission::PipelinePermissionsUpdate;
use azpipe_core::dto::pipeline::{CreatePipelineRequest, PipelineResponse};
use reqwest::Method;
use tracing::debug;

impl AzureDevOpsClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new YAML pipeline
    ///
    /// # Arguments
    /// * `project` - Organization and project that own the pipeline
    /// * `req` - The pipeline creation request
    ///
    /// # Returns
    /// The created pipeline
    ///
    /// # Example
    /// ```no_run
    /// # use azpipe_client::{ApiVersions, AzureDevOpsClient};
    /// # use azpipe_core::domain::ProjectRef;
    /// # use azpipe_core::domain::pipeline::PipelineDefinition;
    /// # use azpipe_core::dto::pipeline::CreatePipelineRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = AzureDevOpsClient::new("dev.azure.com", "pat", ApiVersions::default());
    /// let definition = PipelineDefinition {
    ///     folder: "/team-a".to_string(),
    ///     name: "svc-build".to_string(),
    ///     repository_id: "0d1e...".to_string(),
    ///     repository_name: "svc".to_string(),
    ///     yaml_path: None,
    /// };
    /// let pipeline = client
    ///     .create_pipeline(&ProjectRef::new("contoso", "platform"), &CreatePipelineRequest::from(&definition))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(
        &self,
        project: &ProjectRef,
        req: &CreatePipelineRequest,
    ) -> Result<PipelineResponse> {
        let url = self.api_url(project, &["pipelines"], &self.versions.create)?;
        debug!("POST {}", url);
        let response = self.request(Method::POST, url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Update which pipelines may use a protected resource
    ///
    /// # Arguments
    /// * `project` - Organization and project that own the resource
    /// * `resource_type` - Resource kind (e.g., "endpoint", "queue")
    /// * `resource_id` - Resource identifier
    /// * `req` - Authorization flags per pipeline
    pub async fn update_pipeline_permissions(
        &self,
        project: &ProjectRef,
        resource_type: &str,
        resource_id: &str,
        req: &PipelinePermissionsUpdate,
    ) -> Result<()> {
        let url = self.api_url(
            project,
            &["pipelines", "pipelinepermissions", resource_type, resource_id],
            &self.versions.permits,
        )?;
        debug!("PATCH {}", url);
        let response = self.request(Method::PATCH, url).json(req).send().await?;

        self.handle_empty_response(response).await
    }
}
