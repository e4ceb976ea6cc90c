//! Template actions
//!
//! - `azure:pipeline:create`: create a YAML pipeline
//! - `azure:pipeline:permit`: authorize a pipeline for a protected resource
//! - `azure:pipeline:run`: run a pipeline and optionally wait for it
//!
//! Inputs use the camelCase names templates pass in.

mod create;
mod permit;
mod run;

pub use create::{CreatePipelineAction, create_pipeline};
pub use permit::{PermitPipelineAction, set_pipeline_permission};
pub use run::RunPipelineAction;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::error;

use crate::error::ActionError;

/// Deserializes a numeric id given either as a number or as a string
fn numeric_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("`{}` is not a numeric id", text))),
    }
}

/// Renders template values as the strings Azure DevOps expects
///
/// Strings pass through unquoted; other JSON values use their JSON text.
fn stringify_values(values: BTreeMap<String, JsonValue>) -> BTreeMap<String, String> {
    values
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

/// Logs a remote failure the way every action reports it
fn log_remote_failure(what: &str, err: &ActionError) {
    match err.status() {
        Some(status) => error!("Failed to {}. Status code {}.", what, status),
        None => error!("Failed to {}. {}", what, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "numeric_id")]
        id: u64,
    }

    #[test]
    fn test_numeric_id_accepts_number_and_string() {
        let from_number: WithId = serde_json::from_value(json!({ "id": 42 })).unwrap();
        let from_string: WithId = serde_json::from_value(json!({ "id": " 42 " })).unwrap();
        assert_eq!(from_number.id, 42);
        assert_eq!(from_string.id, 42);
    }

    #[test]
    fn test_numeric_id_rejects_text() {
        assert!(serde_json::from_value::<WithId>(json!({ "id": "build-42" })).is_err());
        assert!(serde_json::from_value::<WithId>(json!({ "id": -1 })).is_err());
    }

    #[test]
    fn test_stringify_values() {
        let values: BTreeMap<String, JsonValue> = serde_json::from_value(json!({
            "env": "prod",
            "replicas": 3,
            "canary": true
        }))
        .unwrap();

        let strings = stringify_values(values);
        assert_eq!(strings["env"], "prod");
        assert_eq!(strings["replicas"], "3");
        assert_eq!(strings["canary"], "true");
    }
}
