//! Run poller
//!
//! Queues a pipeline run and polls its build status at a fixed interval.
//! Polling is a bounded loop: it ends on a terminal status, on a non-success
//! HTTP response, on an unknown status, when the optional deadline would be
//! overrun, or when the cancellation token fires. Both the delay between polls
//! and every in-flight request race the cancellation token and the deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use azpipe_client::PipelinesApi;
use azpipe_core::domain::ProjectRef;
use azpipe_core::domain::run::{PipelineRunHandle, PipelineRunRequest, PipelineRunStatus, RunResult};
use azpipe_core::dto::run::RunPipelineRequest;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::engine::outcome::{RunOutcome, RunReport};
use crate::error::{ActionError, Result};

/// Polling behavior for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status polls
    pub interval: Duration,
    /// Maximum time spent polling; `None` polls until a terminal status
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            deadline: None,
        }
    }
}

/// Submits and follows runs of pipelines in one project
///
/// The API handle, and therefore the token, is fixed at construction and
/// reused for the submit call and every poll.
pub struct RunPoller {
    api: Arc<dyn PipelinesApi>,
    project: ProjectRef,
    settings: PollSettings,
}

impl RunPoller {
    /// Creates a new run poller
    pub fn new(api: Arc<dyn PipelinesApi>, project: ProjectRef, settings: PollSettings) -> Self {
        Self {
            api,
            project,
            settings,
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Queues a run of `pipeline_id`
    ///
    /// # Errors
    /// [`ActionError::RemoteRequest`] on a non-success response; no retry.
    pub async fn submit_run(
        &self,
        pipeline_id: u64,
        request: &PipelineRunRequest,
    ) -> Result<PipelineRunHandle> {
        let body = RunPipelineRequest::from(request);
        let run = self
            .api
            .run_pipeline(&self.project, pipeline_id, &body)
            .await?;

        let handle = match run.links.web_href() {
            Some(href) => {
                info!("Successfully started Azure pipeline run: {}", href);
                PipelineRunHandle::new(run.id, href)
            }
            None => {
                warn!("Run {} of pipeline {} has no web link", run.id, pipeline_id);
                info!("Successfully started Azure pipeline run {}", run.id);
                PipelineRunHandle::without_web_url(run.id)
            }
        };

        Ok(handle)
    }

    /// Reads the current status of a run
    ///
    /// # Errors
    /// [`ActionError::UnexpectedStatus`] for a status outside the known set.
    pub async fn poll_status(&self, handle: &PipelineRunHandle) -> Result<PipelineRunStatus> {
        let build = self.api.get_build(&self.project, handle.run_id()).await?;

        PipelineRunStatus::from_remote(&build.status, build.result.as_deref())
            .ok_or(ActionError::UnexpectedStatus(build.status))
    }

    /// Polls until the run completes and returns its result
    pub async fn wait_for_result(
        &self,
        handle: &PipelineRunHandle,
        cancel: &CancelToken,
    ) -> Result<RunResult> {
        let started = Instant::now();
        let deadline = self.settings.deadline.map(|limit| (started + limit, limit));
        let mut polls = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(ActionError::Cancelled);
            }

            let status = bounded(self.poll_status(handle), cancel, deadline).await?;
            polls += 1;

            match status {
                PipelineRunStatus::Completed(result) => {
                    debug!(
                        "Run {} completed with result {} after {} poll(s)",
                        handle.run_id(),
                        result,
                        polls
                    );
                    return Ok(result);
                }
                pending => {
                    debug!(
                        "Run {} is {:?} (poll {}), checking again in {:?}",
                        handle.run_id(),
                        pending,
                        polls,
                        self.settings.interval
                    );
                }
            }

            let wake = Instant::now() + self.settings.interval;
            if let Some((at, limit)) = deadline {
                if wake > at {
                    return Err(ActionError::DeadlineExceeded(limit));
                }
            }

            tokio::select! {
                _ = time::sleep_until(wake) => {}
                _ = cancel.cancelled() => return Err(ActionError::Cancelled),
            }
        }
    }

    /// Polls until the run completes
    ///
    /// Returns `true` only when the run completed with `succeeded`.
    pub async fn await_completion(
        &self,
        handle: &PipelineRunHandle,
        cancel: &CancelToken,
    ) -> Result<bool> {
        Ok(self.wait_for_result(handle, cancel).await?.is_success())
    }

    /// Submits a run and follows it to the end
    ///
    /// Never fails: errors from either step are logged and folded into the
    /// returned report.
    pub async fn run_pipeline_and_wait(
        &self,
        pipeline_id: u64,
        request: &PipelineRunRequest,
        cancel: &CancelToken,
    ) -> RunReport {
        let handle = match bounded(self.submit_run(pipeline_id, request), cancel, None).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to run Azure pipeline. {}", e);
                return RunReport {
                    handle: None,
                    outcome: RunOutcome::from_error(&e),
                };
            }
        };

        let outcome = match self.wait_for_result(&handle, cancel).await {
            Ok(result) => {
                if result.is_success() {
                    info!("Azure pipeline completed successfully.");
                } else {
                    error!("Azure pipeline failed with result {}.", result);
                }
                RunOutcome::from_result(result)
            }
            Err(e) => {
                error!("{}", e);
                RunOutcome::from_error(&e)
            }
        };

        RunReport {
            handle: Some(handle),
            outcome,
        }
    }
}

/// Runs one remote call, giving up on cancellation or once the deadline passes
async fn bounded<T>(
    call: impl Future<Output = Result<T>>,
    cancel: &CancelToken,
    deadline: Option<(Instant, Duration)>,
) -> Result<T> {
    let limited = async {
        match deadline {
            Some((at, limit)) => match time::timeout_at(at, call).await {
                Ok(result) => result,
                Err(_) => Err(ActionError::DeadlineExceeded(limit)),
            },
            None => call.await,
        }
    };

    tokio::select! {
        biased;
        result = limited => result,
        _ = cancel.cancelled() => Err(ActionError::Cancelled),
    }
}
