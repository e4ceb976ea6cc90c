//! `azure:pipeline:run`

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use azpipe_core::domain::ProjectRef;
use azpipe_core::domain::run::{PipelineRunRequest, RunVariable};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::info;

use super::{log_remote_failure, numeric_id, stringify_values};
use crate::action::{ActionEnv, TemplateAction};
use crate::context::ActionContext;
use crate::engine::{PollSettings, RunOutcome, RunPoller, RunReport};
use crate::error::{ActionError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunPipelineInput {
    run_api_version: Option<String>,
    build_api_version: Option<String>,
    server: Option<String>,
    organization: String,
    #[serde(deserialize_with = "numeric_id")]
    pipeline_id: u64,
    project: String,
    branch: Option<String>,
    token: Option<String>,
    #[serde(default)]
    pipeline_parameters: BTreeMap<String, JsonValue>,
    #[serde(default)]
    pipeline_variables: BTreeMap<String, JsonValue>,
    yaml_overrides: Option<String>,
    wait_for_completion: Option<bool>,
    poll_interval_seconds: Option<u64>,
    timeout_seconds: Option<u64>,
}

/// Runs a pipeline and, by default, waits until it finishes
///
/// Remote failures never fail the action. The `runResult` output reports
/// how the run ended; `runId` and `runUrl` are set once the run was queued.
pub struct RunPipelineAction {
    env: ActionEnv,
}

impl RunPipelineAction {
    pub const ID: &'static str = "azure:pipeline:run";

    pub fn new(env: ActionEnv) -> Self {
        Self { env }
    }

    fn poll_settings(&self, input: &RunPipelineInput) -> Result<PollSettings> {
        let interval = input
            .poll_interval_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.env.config.poll_interval);
        if interval.is_zero() {
            return Err(ActionError::InvalidInput(
                "pollIntervalSeconds must be greater than 0".to_string(),
            ));
        }

        let deadline = match input.timeout_seconds {
            Some(0) => {
                return Err(ActionError::InvalidInput(
                    "timeoutSeconds must be greater than 0".to_string(),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => self.env.config.run_timeout,
        };

        Ok(PollSettings { interval, deadline })
    }

    fn run_request(&self, input: &mut RunPipelineInput) -> PipelineRunRequest {
        let branch = input
            .branch
            .take()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.env.config.default_branch.clone());

        PipelineRunRequest {
            target_branch: branch,
            template_parameters: stringify_values(std::mem::take(&mut input.pipeline_parameters)),
            yaml_overrides: input.yaml_overrides.take(),
            variables: stringify_values(std::mem::take(&mut input.pipeline_variables))
                .into_iter()
                .map(|(k, v)| (k, RunVariable::plain(v)))
                .collect(),
        }
    }
}

#[async_trait]
impl TemplateAction for RunPipelineAction {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn description(&self) -> &'static str {
        "Runs an Azure DevOps pipeline and waits for it to complete"
    }

    fn schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "required": ["organization", "pipelineId", "project"],
            "properties": {
                "runApiVersion": {
                    "type": "string",
                    "title": "Run API version",
                    "description": "The Azure Run Pipeline API version to use. Defaults to 7.0"
                },
                "buildApiVersion": {
                    "type": "string",
                    "title": "Build API version",
                    "description": "The Builds API version to use. Defaults to 6.1-preview.6"
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
                "pipelineId": {
                    "type": "string",
                    "title": "Pipeline ID",
                    "description": "The pipeline ID."
                },
                "project": {
                    "type": "string",
                    "title": "Project",
                    "description": "The name of the Azure project."
                },
                "branch": {
                    "type": "string",
                    "title": "Repository Branch",
                    "description": "The branch of the pipeline's repository."
                },
                "pipelineParameters": {
                    "type": "object",
                    "title": "Pipeline Parameters",
                    "description": "The values you need as parameters on the request to start a build."
                },
                "pipelineVariables": {
                    "type": "object",
                    "title": "Pipeline Variables",
                    "description": "Queue-time variables for the run."
                },
                "yamlOverrides": {
                    "type": "string",
                    "title": "YAML Overrides",
                    "description": "YAML that replaces the pipeline definition for this run."
                },
                "waitForCompletion": {
                    "type": "boolean",
                    "title": "Wait for completion",
                    "description": "Poll the run until it finishes. Defaults to true"
                },
                "pollIntervalSeconds": {
                    "type": "integer",
                    "title": "Poll interval",
                    "description": "Seconds between two status checks. Defaults to 10"
                },
                "timeoutSeconds": {
                    "type": "integer",
                    "title": "Timeout",
                    "description": "Give up waiting after this many seconds. Defaults to no limit"
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
        let mut input: RunPipelineInput = ctx.input()?;
        let settings = self.poll_settings(&input)?;

        let mut versions = self.env.config.api_versions.clone();
        if let Some(version) = input.run_api_version.take() {
            versions.run = version;
        }
        if let Some(version) = input.build_api_version.take() {
            versions.build = version;
        }

        let api = self
            .env
            .connect(
                input.server.as_deref(),
                &input.organization,
                input.token.take(),
                versions,
            )
            .await?;

        info!("Running Azure pipeline with the ID {}.", input.pipeline_id);

        let request = self.run_request(&mut input);
        let project = ProjectRef::new(input.organization, input.project);
        let poller = RunPoller::new(api, project, settings);

        let report = if input.wait_for_completion.unwrap_or(true) {
            poller
                .run_pipeline_and_wait(input.pipeline_id, &request, ctx.cancel_token())
                .await
        } else {
            match poller.submit_run(input.pipeline_id, &request).await {
                Ok(handle) => RunReport {
                    handle: Some(handle),
                    outcome: RunOutcome::Submitted,
                },
                Err(e) => {
                    log_remote_failure("run Azure pipeline", &e);
                    RunReport {
                        handle: None,
                        outcome: RunOutcome::from_error(&e),
                    }
                }
            }
        };

        if let Some(handle) = &report.handle {
            ctx.output("runId", handle.run_id().to_string());
            if let Some(url) = handle.web_url() {
                ctx.output("runUrl", url);
            }
        }
        ctx.output("runResult", report.outcome.as_str());

        Ok(())
    }
}
