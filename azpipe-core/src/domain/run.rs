//! Pipeline run domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request to start one run of a pipeline
///
/// Built fresh for every invocation and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunRequest {
    pub target_branch: String,
    pub template_parameters: BTreeMap<String, String>,
    pub yaml_overrides: Option<String>,
    pub variables: BTreeMap<String, RunVariable>,
}

impl PipelineRunRequest {
    pub fn new(target_branch: impl Into<String>) -> Self {
        Self {
            target_branch: target_branch.into(),
            ..Default::default()
        }
    }

    /// Adds a template parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_parameters.insert(key.into(), value.into());
        self
    }

    /// Adds a run variable
    pub fn with_variable(mut self, key: impl Into<String>, variable: RunVariable) -> Self {
        self.variables.insert(key.into(), variable);
        self
    }

    /// Fully qualified git ref of the target branch
    ///
    /// A branch that already starts with `refs/` is passed through.
    pub fn ref_name(&self) -> String {
        if self.target_branch.starts_with("refs/") {
            self.target_branch.clone()
        } else {
            format!("refs/heads/{}", self.target_branch)
        }
    }
}

/// Pipeline variable value supplied at queue time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunVariable {
    pub value: String,
    pub is_secret: bool,
}

impl RunVariable {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_secret: false,
        }
    }
}

/// Handle to a submitted run
///
/// The run id never changes once obtained; every status poll uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunHandle {
    run_id: u64,
    web_url: Option<String>,
}

impl PipelineRunHandle {
    pub fn new(run_id: u64, web_url: impl Into<String>) -> Self {
        Self {
            run_id,
            web_url: Some(web_url.into()),
        }
    }

    /// Handle for a run the service returned without a web link
    pub fn without_web_url(run_id: u64) -> Self {
        Self {
            run_id,
            web_url: None,
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }
}

/// Final result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunResult {
    Succeeded,
    Failed,
    /// Any other result reported by the service (e.g. `canceled`, `partiallySucceeded`)
    Other(String),
}

impl RunResult {
    pub fn from_remote(result: Option<&str>) -> Self {
        match result {
            Some("succeeded") => RunResult::Succeeded,
            Some("failed") => RunResult::Failed,
            Some(other) => RunResult::Other(other.to_string()),
            None => RunResult::Other("none".to_string()),
        }
    }

    /// Only `succeeded` counts as success; there is no partial success
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Succeeded)
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunResult::Succeeded => write!(f, "succeeded"),
            RunResult::Failed => write!(f, "failed"),
            RunResult::Other(other) => write!(f, "{}", other),
        }
    }
}

/// Latest observed state of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineRunStatus {
    NotStarted,
    InProgress,
    Completed(RunResult),
}

impl PipelineRunStatus {
    /// Maps the remote `status`/`result` pair onto a run status
    ///
    /// Returns `None` for a status outside `completed`, `inProgress` and
    /// `notStarted`.
    pub fn from_remote(status: &str, result: Option<&str>) -> Option<Self> {
        match status {
            "completed" => Some(PipelineRunStatus::Completed(RunResult::from_remote(result))),
            "inProgress" => Some(PipelineRunStatus::InProgress),
            "notStarted" => Some(PipelineRunStatus::NotStarted),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineRunStatus::Completed(_))
    }
}
