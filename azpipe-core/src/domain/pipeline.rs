//! Pipeline domain types

use serde::{Deserialize, Serialize};

/// Location of the pipeline definition file when a template does not name one
pub const DEFAULT_YAML_PATH: &str = "/azure-pipelines.yaml";

/// Pipeline to be created in an Azure Repos Git repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub folder: String,
    pub name: String,
    pub repository_id: String,
    pub repository_name: String,
    pub yaml_path: Option<String>,
}

impl PipelineDefinition {
    /// Path of the YAML definition, falling back to [`DEFAULT_YAML_PATH`]
    ///
    /// An empty path counts as absent.
    pub fn yaml_path(&self) -> &str {
        match self.yaml_path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => DEFAULT_YAML_PATH,
        }
    }
}

/// Pipeline as reported back by the create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPipeline {
    pub id: u64,
    pub web_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(yaml_path: Option<&str>) -> PipelineDefinition {
        PipelineDefinition {
            folder: "/team-a".to_string(),
            name: "svc-build".to_string(),
            repository_id: "repo-id".to_string(),
            repository_name: "svc".to_string(),
            yaml_path: yaml_path.map(str::to_string),
        }
    }

    #[test]
    fn test_yaml_path_defaults_when_absent() {
        assert_eq!(definition(None).yaml_path(), "/azure-pipelines.yaml");
    }

    #[test]
    fn test_yaml_path_defaults_when_empty() {
        assert_eq!(definition(Some("")).yaml_path(), DEFAULT_YAML_PATH);
    }

    #[test]
    fn test_yaml_path_explicit() {
        assert_eq!(
            definition(Some("/ci/build.yml")).yaml_path(),
            "/ci/build.yml"
        );
    }
}
