//! Trait seam over the Azure DevOps endpoints
//!
//! Actions depend on [`PipelinesApi`] rather than on the concrete client so
//! the run-and-poll logic can be exercised against scripted responses.

use async_trait::async_trait;
use azpipe_core::domain::ProjectRef;
use azpipe_core::dto::permission::PipelinePermissionsUpdate;
use azpipe_core::dto::pipeline::{CreatePipelineRequest, PipelineResponse};
use azpipe_core::dto::run::{BuildResponse, RunPipelineRequest, RunResponse};

use crate::AzureDevOpsClient;
use crate::error::Result;

/// Operations the template actions perform against Azure DevOps
#[async_trait]
pub trait PipelinesApi: Send + Sync {
    /// Creates a pipeline
    async fn create_pipeline(
        &self,
        project: &ProjectRef,
        req: &CreatePipelineRequest,
    ) -> Result<PipelineResponse>;

    /// Sets pipeline authorization for a resource
    async fn update_pipeline_permissions(
        &self,
        project: &ProjectRef,
        resource_type: &str,
        resource_id: &str,
        req: &PipelinePermissionsUpdate,
    ) -> Result<()>;

    /// Queues a pipeline run
    async fn run_pipeline(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
        req: &RunPipelineRequest,
    ) -> Result<RunResponse>;

    /// Reads the current status of a run
    async fn get_build(&self, project: &ProjectRef, build_id: u64) -> Result<BuildResponse>;
}

#[async_trait]
impl PipelinesApi for AzureDevOpsClient {
    async fn create_pipeline(
        &self,
        project: &ProjectRef,
        req: &CreatePipelineRequest,
    ) -> Result<PipelineResponse> {
        AzureDevOpsClient::create_pipeline(self, project, req).await
    }

    async fn update_pipeline_permissions(
        &self,
        project: &ProjectRef,
        resource_type: &str,
        resource_id: &str,
        req: &PipelinePermissionsUpdate,
    ) -> Result<()> {
        AzureDevOpsClient::update_pipeline_permissions(self, project, resource_type, resource_id, req)
            .await
    }

    async fn run_pipeline(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
        req: &RunPipelineRequest,
    ) -> Result<RunResponse> {
        AzureDevOpsClient::run_pipeline(self, project, pipeline_id, req).await
    }

    async fn get_build(&self, project: &ProjectRef, build_id: u64) -> Result<BuildResponse> {
        AzureDevOpsClient::get_build(self, project, build_id).await
    }
}
