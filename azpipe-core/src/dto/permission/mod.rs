//! Pipeline permission DTOs

use serde::{Deserialize, Serialize};

use crate::domain::permission::AuthorizationRequest;

/// PATCH body for `pipelinepermissions/{resourceType}/{resourceId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePermissionsUpdate {
    pub pipelines: Vec<PipelinePermission>,
}

/// Authorization flag for one pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePermission {
    pub authorized: bool,
    pub id: u64,
}

impl From<&AuthorizationRequest> for PipelinePermissionsUpdate {
    fn from(req: &AuthorizationRequest) -> Self {
        Self {
            pipelines: vec![PipelinePermission {
                authorized: req.authorized,
                id: req.pipeline_id,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_body_shape() {
        let req = AuthorizationRequest {
            resource_type: "endpoint".to_string(),
            resource_id: "svc-conn".to_string(),
            pipeline_id: 17,
            authorized: true,
        };

        let body = serde_json::to_value(PipelinePermissionsUpdate::from(&req)).unwrap();
        assert_eq!(
            body,
            json!({ "pipelines": [ { "authorized": true, "id": 17 } ] })
        );
    }

    #[test]
    fn test_same_request_same_body() {
        let req = AuthorizationRequest {
            resource_type: "queue".to_string(),
            resource_id: "42".to_string(),
            pipeline_id: 3,
            authorized: false,
        };

        assert_eq!(
            PipelinePermissionsUpdate::from(&req),
            PipelinePermissionsUpdate::from(&req.clone())
        );
    }
}
