//! Pipeline command arguments
//!
//! Each subcommand maps its flags onto the JSON input of the matching action.

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value as JsonValue, json};

/// Flags every pipeline command shares
#[derive(Args, Debug)]
pub struct Target {
    /// Azure DevOps host (defaults to AZDO_HOST or dev.azure.com)
    #[arg(long)]
    server: Option<String>,

    /// Azure DevOps organization
    #[arg(short, long)]
    organization: String,

    /// Azure DevOps project
    #[arg(short, long)]
    project: String,
}

impl Target {
    fn into_input(self) -> Map<String, JsonValue> {
        let mut input = Map::new();
        input.insert("organization".into(), json!(self.organization));
        input.insert("project".into(), json!(self.project));
        insert_opt(&mut input, "server", self.server);
        input
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    target: Target,

    /// Folder the pipeline is created in
    #[arg(long, default_value = "\\")]
    folder: String,

    /// Pipeline name
    #[arg(short, long)]
    name: String,

    /// Repository ID
    #[arg(long)]
    repository_id: String,

    /// Repository name
    #[arg(long)]
    repository_name: String,

    /// Path of the YAML definition inside the repository
    #[arg(long)]
    yaml_path: Option<String>,

    /// Override the create API version
    #[arg(long)]
    api_version: Option<String>,
}

impl CreateArgs {
    pub fn into_input(self) -> JsonValue {
        let mut input = self.target.into_input();
        input.insert("folder".into(), json!(self.folder));
        input.insert("name".into(), json!(self.name));
        input.insert("repositoryId".into(), json!(self.repository_id));
        input.insert("repositoryName".into(), json!(self.repository_name));
        insert_opt(&mut input, "yamlPath", self.yaml_path);
        insert_opt(&mut input, "createApiVersion", self.api_version);
        JsonValue::Object(input)
    }
}

#[derive(Args, Debug)]
pub struct PermitArgs {
    #[command(flatten)]
    target: Target,

    /// Pipeline ID
    #[arg(long)]
    pipeline_id: u64,

    /// Resource type (e.g. endpoint, queue, variablegroup)
    #[arg(long)]
    resource_type: String,

    /// Resource ID
    #[arg(long)]
    resource_id: String,

    /// Revoke the authorization instead of granting it
    #[arg(long)]
    revoke: bool,

    /// Override the permits API version
    #[arg(long)]
    api_version: Option<String>,
}

impl PermitArgs {
    pub fn into_input(self) -> JsonValue {
        let mut input = self.target.into_input();
        input.insert("pipelineId".into(), json!(self.pipeline_id));
        input.insert("resourceType".into(), json!(self.resource_type));
        input.insert("resourceId".into(), json!(self.resource_id));
        input.insert("authorized".into(), json!(!self.revoke));
        insert_opt(&mut input, "permitsApiVersion", self.api_version);
        JsonValue::Object(input)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    target: Target,

    /// Pipeline ID
    #[arg(long)]
    pipeline_id: u64,

    /// Branch to run (defaults to AZDO_DEFAULT_BRANCH or main)
    #[arg(short, long)]
    branch: Option<String>,

    /// Template parameters as key=value pairs
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Queue-time variables as key=value pairs
    #[arg(long = "var", value_parser = parse_key_val)]
    vars: Vec<(String, String)>,

    /// File whose content replaces the pipeline YAML for this run
    #[arg(long)]
    yaml_overrides: Option<std::path::PathBuf>,

    /// Return once the run is queued
    #[arg(long)]
    no_wait: bool,

    /// Seconds between status polls
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Stop waiting after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Override the run API version
    #[arg(long)]
    run_api_version: Option<String>,

    /// Override the build API version
    #[arg(long)]
    build_api_version: Option<String>,
}

impl RunArgs {
    pub fn into_input(self) -> Result<JsonValue> {
        let mut input = self.target.into_input();
        input.insert("pipelineId".into(), json!(self.pipeline_id));
        insert_opt(&mut input, "branch", self.branch);
        if !self.params.is_empty() {
            input.insert("pipelineParameters".into(), pairs(self.params));
        }
        if !self.vars.is_empty() {
            input.insert("pipelineVariables".into(), pairs(self.vars));
        }
        if let Some(path) = self.yaml_overrides {
            let yaml = std::fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("Failed to read YAML overrides {}: {}", path.display(), e)
            })?;
            input.insert("yamlOverrides".into(), json!(yaml));
        }
        if self.no_wait {
            input.insert("waitForCompletion".into(), json!(false));
        }
        insert_opt(&mut input, "pollIntervalSeconds", self.poll_interval);
        insert_opt(&mut input, "timeoutSeconds", self.timeout);
        insert_opt(&mut input, "runApiVersion", self.run_api_version);
        insert_opt(&mut input, "buildApiVersion", self.build_api_version);
        Ok(JsonValue::Object(input))
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn pairs(values: Vec<(String, String)>) -> JsonValue {
    JsonValue::Object(values.into_iter().map(|(k, v)| (k, json!(v))).collect())
}

fn insert_opt<T: Into<JsonValue>>(input: &mut Map<String, JsonValue>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        input.insert(key.to_string(), value.into());
    }
}
