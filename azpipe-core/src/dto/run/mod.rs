//! Pipeline run and build status DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Links;
use crate::domain::run::{PipelineRunRequest, RunVariable};

/// POST body for `_apis/pipelines/{pipelineId}/runs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPipelineRequest {
    pub resources: RunResources,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub template_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml_overrides: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResources {
    pub repositories: RunRepositories,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRepositories {
    #[serde(rename = "self")]
    pub self_repo: RepositoryResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResource {
    pub ref_name: String,
}

/// Queue-time variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub value: String,
    pub is_secret: bool,
}

impl From<&RunVariable> for Variable {
    fn from(var: &RunVariable) -> Self {
        Self {
            value: var.value.clone(),
            is_secret: var.is_secret,
        }
    }
}

impl From<&PipelineRunRequest> for RunPipelineRequest {
    fn from(req: &PipelineRunRequest) -> Self {
        Self {
            resources: RunResources {
                repositories: RunRepositories {
                    self_repo: RepositoryResource {
                        ref_name: req.ref_name(),
                    },
                },
            },
            template_parameters: req.template_parameters.clone(),
            variables: req
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), Variable::from(v)))
                .collect(),
            yaml_overrides: req.yaml_overrides.clone(),
        }
    }
}

/// Run resource returned when a run is queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Build resource returned by `_apis/build/builds/{runId}`
///
/// `status` is one of `notStarted`, `inProgress`, `completed` (or a value
/// the actions treat as unexpected); `result` is only set once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResponse {
    pub id: u64,
    pub status: String,
    #[serde(default)]
    pub result: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_body_shape() {
        let req = PipelineRunRequest::new("release").with_parameter("env", "prod");

        let body = serde_json::to_value(RunPipelineRequest::from(&req)).unwrap();
        assert_eq!(
            body,
            json!({
                "resources": { "repositories": { "self": { "refName": "refs/heads/release" } } },
                "templateParameters": { "env": "prod" }
            })
        );
    }

    #[test]
    fn test_run_body_carries_variables_and_overrides() {
        let mut req = PipelineRunRequest::new("main")
            .with_variable("region", RunVariable::plain("westeurope"));
        req.yaml_overrides = Some(String::new());

        let body = serde_json::to_value(RunPipelineRequest::from(&req)).unwrap();
        assert_eq!(
            body["variables"],
            json!({ "region": { "value": "westeurope", "isSecret": false } })
        );
        assert_eq!(body["yamlOverrides"], json!(""));
        assert!(body.get("templateParameters").is_none());
    }

    #[test]
    fn test_build_response_without_result() {
        let build: BuildResponse =
            serde_json::from_value(json!({ "id": 7, "status": "inProgress" })).unwrap();
        assert_eq!(build.status, "inProgress");
        assert_eq!(build.result, None);
    }
}
