//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use super::Links;
use crate::domain::pipeline::PipelineDefinition;

/// Repository type for pipelines hosted in Azure Repos
pub const AZURE_REPOS_GIT: &str = "azureReposGit";

/// POST body for `_apis/pipelines`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePipelineRequest {
    pub folder: String,
    pub name: String,
    pub configuration: PipelineConfiguration,
}

/// YAML configuration block of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfiguration {
    #[serde(rename = "type")]
    pub config_type: String,
    pub path: String,
    pub repository: RepositoryRef,
}

/// Repository the pipeline definition lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub repository_type: String,
}

impl From<&PipelineDefinition> for CreatePipelineRequest {
    fn from(def: &PipelineDefinition) -> Self {
        Self {
            folder: def.folder.clone(),
            name: def.name.clone(),
            configuration: PipelineConfiguration {
                config_type: "yaml".to_string(),
                path: def.yaml_path().to_string(),
                repository: RepositoryRef {
                    id: def.repository_id.clone(),
                    name: def.repository_name.clone(),
                    repository_type: AZURE_REPOS_GIT.to_string(),
                },
            },
        }
    }
}

/// Pipeline resource returned by the create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_defaults_yaml_path() {
        let def = PipelineDefinition {
            folder: "/team-a".to_string(),
            name: "svc-build".to_string(),
            repository_id: "b1c2".to_string(),
            repository_name: "svc".to_string(),
            yaml_path: None,
        };

        let body = serde_json::to_value(CreatePipelineRequest::from(&def)).unwrap();
        assert_eq!(
            body,
            json!({
                "folder": "/team-a",
                "name": "svc-build",
                "configuration": {
                    "type": "yaml",
                    "path": "/azure-pipelines.yaml",
                    "repository": { "id": "b1c2", "name": "svc", "type": "azureReposGit" }
                }
            })
        );
    }

    #[test]
    fn test_pipeline_response_reads_web_link() {
        let response: PipelineResponse = serde_json::from_value(json!({
            "id": 42,
            "name": "svc-build",
            "revision": 1,
            "_links": { "web": { "href": "https://dev.azure.com/contoso/web/build.aspx?id=42" } }
        }))
        .unwrap();

        assert_eq!(response.id, 42);
        assert_eq!(
            response.links.web_href(),
            Some("https://dev.azure.com/contoso/web/build.aspx?id=42")
        );
    }
}
