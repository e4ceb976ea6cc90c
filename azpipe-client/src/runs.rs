//! Run-related API endpoints

use crate::AzureDevOpsClient;
use crate::error::Result;
use azpipe_core::domain::ProjectRef;
use azpipe_core::dto::run::{BuildResponse, RunPipelineRequest, RunResponse};
use reqwest::Method;
use tracing::debug;

impl AzureDevOpsClient {
    // =============================================================================
    // Runs
    // =============================================================================

    /// Queue a run of a pipeline
    ///
    /// # Arguments
    /// * `project` - Organization and project that own the pipeline
    /// * `pipeline_id` - Numeric pipeline identifier
    /// * `req` - Branch, template parameters and variables for the run
    ///
    /// # Returns
    /// The queued run (id and web link)
    pub async fn run_pipeline(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
        req: &RunPipelineRequest,
    ) -> Result<RunResponse> {
        let pipeline_id = pipeline_id.to_string();
        let url = self.api_url(project, &["pipelines", pipeline_id.as_str(), "runs"], &self.versions.run)?;
        debug!("POST {}", url);
        let response = self.request(Method::POST, url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the build behind a run
    ///
    /// A pipeline run id doubles as the build id, which is where Azure DevOps
    /// reports `status` and `result`.
    ///
    /// # Arguments
    /// * `project` - Organization and project that own the run
    /// * `build_id` - Run identifier
    pub async fn get_build(&self, project: &ProjectRef, build_id: u64) -> Result<BuildResponse> {
        let build_id = build_id.to_string();
        let url = self.api_url(project, &["build", "builds", build_id.as_str()], &self.versions.build)?;
        debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiVersions, ClientError};
    use azpipe_core::domain::run::PipelineRunRequest;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// `base64("PAT:secret-pat")`
    const BASIC_AUTH: &str = "Basic UEFUOnNlY3JldC1wYXQ=";

    fn client_for_server(server: &MockServer) -> AzureDevOpsClient {
        AzureDevOpsClient::new(server.uri(), "secret-pat", ApiVersions::default())
    }

    #[tokio::test]
    async fn test_run_pipeline_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/platform/_apis/pipelines/12/runs"))
            .and(query_param("api-version", "7.0"))
            .and(header("authorization", BASIC_AUTH))
            .and(header("x-tfs-fedauthredirect", "Suppress"))
            .and(body_json(json!({
                "resources": { "repositories": { "self": { "refName": "refs/heads/release" } } },
                "templateParameters": { "env": "prod" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 100,
                "state": "inProgress",
                "_links": { "web": { "href": "https://dev.azure.com/contoso/platform/_build/results?buildId=100" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PipelineRunRequest::new("release").with_parameter("env", "prod");
        let run = client_for_server(&server)
            .run_pipeline(
                &ProjectRef::new("contoso", "platform"),
                12,
                &RunPipelineRequest::from(&request),
            )
            .await
            .unwrap();

        assert_eq!(run.id, 100);
        assert_eq!(
            run.links.web_href(),
            Some("https://dev.azure.com/contoso/platform/_build/results?buildId=100")
        );
    }

    #[tokio::test]
    async fn test_run_pipeline_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/platform/_apis/pipelines/12/runs"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for_server(&server)
            .run_pipeline(
                &ProjectRef::new("contoso", "platform"),
                12,
                &RunPipelineRequest::from(&PipelineRunRequest::new("main")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_get_build_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contoso/platform/_apis/build/builds/100"))
            .and(query_param("api-version", "6.1-preview.6"))
            .and(header("authorization", BASIC_AUTH))
            .and(header("x-tfs-fedauthredirect", "Suppress"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 100,
                "status": "completed",
                "result": "succeeded"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let build = client_for_server(&server)
            .get_build(&ProjectRef::new("contoso", "platform"), 100)
            .await
            .unwrap();

        assert_eq!(build.id, 100);
        assert_eq!(build.status, "completed");
        assert_eq!(build.result.as_deref(), Some("succeeded"));
    }

    #[tokio::test]
    async fn test_get_build_unavailable_and_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contoso/platform/_apis/build/builds/1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contoso/platform/_apis/build/builds/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in</html>"))
            .mount(&server)
            .await;

        let client = client_for_server(&server);
        let project = ProjectRef::new("contoso", "platform");

        let unavailable = client.get_build(&project, 1).await.unwrap_err();
        assert_eq!(unavailable.status(), Some(503));

        let malformed = client.get_build(&project, 2).await.unwrap_err();
        assert!(matches!(malformed, ClientError::ParseError(_)));
    }
}
