//! Core domain types
//!
//! These types describe what a template asks for (a pipeline to create, a run
//! to start, a permission to toggle) independently of the REST wire format.
//! The client crate maps them onto DTOs.

pub mod permission;
pub mod pipeline;
pub mod run;

use serde::{Deserialize, Serialize};

/// Organization and project pair that prefixes every Azure DevOps API path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub organization: String,
    pub project: String,
}

impl ProjectRef {
    pub fn new(organization: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
        }
    }
}

impl std::fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.organization, self.project)
    }
}
