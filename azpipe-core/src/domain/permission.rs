//! Resource authorization domain types

use serde::{Deserialize, Serialize};

/// Grant or revoke a pipeline's access to a protected resource
///
/// `resource_type` is the Azure DevOps resource kind (e.g. `endpoint`,
/// `queue`, `variablegroup`, `environment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub resource_type: String,
    pub resource_id: String,
    pub pipeline_id: u64,
    pub authorized: bool,
}

impl AuthorizationRequest {
    /// Verb used when logging this request
    pub fn verb(&self) -> &'static str {
        if self.authorized {
            "Authorizing"
        } else {
            "Unauthorizing"
        }
    }
}
