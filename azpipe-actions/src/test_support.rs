//! Scripted fakes shared by the unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azpipe_client::{ApiVersions, ClientError, PipelinesApi};
use azpipe_core::domain::ProjectRef;
use azpipe_core::dto::permission::PipelinePermissionsUpdate;
use azpipe_core::dto::pipeline::{CreatePipelineRequest, PipelineResponse};
use azpipe_core::dto::run::{BuildResponse, RunPipelineRequest, RunResponse};
use azpipe_core::dto::{Link, Links};
use tokio::time::Instant;

use crate::action::ActionEnv;
use crate::config::ActionConfig;
use crate::connector::Connector;
use crate::credentials::IntegrationRegistry;
use crate::error::Result;

/// Scripted answer to one call
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16),
}

impl<T: Clone> Reply<T> {
    fn into_result(self) -> azpipe_client::Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status) => Err(ClientError::api_error(status, "scripted failure")),
        }
    }
}

pub fn web_links(href: &str) -> Links {
    Links {
        web: Some(Link {
            href: href.to_string(),
        }),
    }
}

pub fn run_response(id: u64) -> RunResponse {
    RunResponse {
        id,
        name: None,
        state: Some("inProgress".to_string()),
        links: web_links(&format!("https://dev.azure.com/contoso/platform/_build/results?buildId={}", id)),
    }
}

pub fn build(status: &str, result: Option<&str>) -> Reply<BuildResponse> {
    Reply::Ok(BuildResponse {
        id: 0,
        status: status.to_string(),
        result: result.map(str::to_string),
    })
}

/// In-memory [`PipelinesApi`] that records every call
///
/// Build polls are answered from a script; the last entry repeats once the
/// script runs out.
pub struct FakeApi {
    create_reply: Reply<PipelineResponse>,
    permit_status: Option<u16>,
    run_reply: Reply<RunResponse>,
    builds: Mutex<VecDeque<Reply<BuildResponse>>>,
    hang_run: bool,
    hang_polls: bool,
    pub creates: Mutex<Vec<(ProjectRef, CreatePipelineRequest)>>,
    pub permits: Mutex<Vec<(String, String, PipelinePermissionsUpdate)>>,
    pub runs: Mutex<Vec<(u64, RunPipelineRequest)>>,
    pub polls: Mutex<Vec<(u64, Instant)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            create_reply: Reply::Ok(PipelineResponse {
                id: 1,
                name: None,
                folder: None,
                links: web_links("https://dev.azure.com/contoso/platform/_build?definitionId=1"),
            }),
            permit_status: None,
            run_reply: Reply::Ok(run_response(100)),
            builds: Mutex::new(VecDeque::from([build("completed", Some("succeeded"))])),
            hang_run: false,
            hang_polls: false,
            creates: Mutex::new(Vec::new()),
            permits: Mutex::new(Vec::new()),
            runs: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_create(mut self, reply: Reply<PipelineResponse>) -> Self {
        self.create_reply = reply;
        self
    }

    pub fn with_permit_status(mut self, status: u16) -> Self {
        self.permit_status = Some(status);
        self
    }

    pub fn with_run(mut self, reply: Reply<RunResponse>) -> Self {
        self.run_reply = reply;
        self
    }

    pub fn with_builds(self, script: Vec<Reply<BuildResponse>>) -> Self {
        *self.builds.lock().unwrap() = script.into();
        self
    }

    /// Run submissions are recorded but never answered
    pub fn hanging_run(mut self) -> Self {
        self.hang_run = true;
        self
    }

    /// Build polls are recorded but never answered
    pub fn hanging_polls(mut self) -> Self {
        self.hang_polls = true;
        self
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PipelinesApi for FakeApi {
    async fn create_pipeline(
        &self,
        project: &ProjectRef,
        req: &CreatePipelineRequest,
    ) -> azpipe_client::Result<PipelineResponse> {
        self.creates
            .lock()
            .unwrap()
            .push((project.clone(), req.clone()));
        self.create_reply.clone().into_result()
    }

    async fn update_pipeline_permissions(
        &self,
        _project: &ProjectRef,
        resource_type: &str,
        resource_id: &str,
        req: &PipelinePermissionsUpdate,
    ) -> azpipe_client::Result<()> {
        self.permits.lock().unwrap().push((
            resource_type.to_string(),
            resource_id.to_string(),
            req.clone(),
        ));
        match self.permit_status {
            Some(status) => Err(ClientError::api_error(status, "scripted failure")),
            None => Ok(()),
        }
    }

    async fn run_pipeline(
        &self,
        _project: &ProjectRef,
        pipeline_id: u64,
        req: &RunPipelineRequest,
    ) -> azpipe_client::Result<RunResponse> {
        self.runs.lock().unwrap().push((pipeline_id, req.clone()));
        if self.hang_run {
            std::future::pending::<()>().await;
        }
        self.run_reply.clone().into_result()
    }

    async fn get_build(
        &self,
        _project: &ProjectRef,
        build_id: u64,
    ) -> azpipe_client::Result<BuildResponse> {
        self.polls.lock().unwrap().push((build_id, Instant::now()));
        if self.hang_polls {
            std::future::pending::<()>().await;
        }
        let mut builds = self.builds.lock().unwrap();
        let reply = if builds.len() > 1 {
            builds.pop_front()
        } else {
            builds.front().cloned()
        };
        match reply.unwrap_or_else(|| build("completed", Some("succeeded"))) {
            Reply::Ok(mut response) => {
                response.id = build_id;
                Ok(response)
            }
            Reply::Status(status) => Err(ClientError::api_error(status, "scripted failure")),
        }
    }
}

/// Connector handing out one shared [`FakeApi`] and recording what it was asked for
pub struct FakeConnector {
    pub api: Arc<FakeApi>,
    pub connections: Mutex<Vec<(String, String, ApiVersions)>>,
}

impl FakeConnector {
    pub fn new(api: FakeApi) -> Self {
        Self {
            api: Arc::new(api),
            connections: Mutex::new(Vec::new()),
        }
    }
}

impl Connector for FakeConnector {
    fn connect(
        &self,
        host: &str,
        token: String,
        versions: ApiVersions,
    ) -> Result<Arc<dyn PipelinesApi>> {
        self.connections
            .lock()
            .unwrap()
            .push((host.to_string(), token, versions));
        let api: Arc<dyn PipelinesApi> = self.api.clone();
        Ok(api)
    }
}

/// Environment wired to a fake connector with a token for dev.azure.com
pub fn fake_env(connector: Arc<FakeConnector>) -> ActionEnv {
    let resolver = IntegrationRegistry::new().with_token("dev.azure.com", "registry-pat");
    ActionEnv::with_connector(ActionConfig::default(), Arc::new(resolver), connector)
}
