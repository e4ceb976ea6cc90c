//! Structured result of a run invocation

use azpipe_core::domain::run::{PipelineRunHandle, RunResult};

use crate::error::ActionError;

/// How a run invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Run was queued and not followed
    Submitted,
    Succeeded,
    /// Run completed with a result other than `succeeded`
    Failed(RunResult),
    Cancelled,
    TimedOut,
    /// Submission or polling failed; carries the error message
    Errored(String),
}

impl RunOutcome {
    pub fn from_error(err: &ActionError) -> Self {
        match err {
            ActionError::Cancelled => RunOutcome::Cancelled,
            ActionError::DeadlineExceeded(_) => RunOutcome::TimedOut,
            other => RunOutcome::Errored(other.to_string()),
        }
    }

    pub fn from_result(result: RunResult) -> Self {
        if result.is_success() {
            RunOutcome::Succeeded
        } else {
            RunOutcome::Failed(result)
        }
    }

    /// Value published as the `runResult` output
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Submitted => "submitted",
            RunOutcome::Succeeded => "succeeded",
            RunOutcome::Failed(_) => "failed",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::TimedOut => "timedOut",
            RunOutcome::Errored(_) => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

/// Outcome of a run invocation plus the handle, when one was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub handle: Option<PipelineRunHandle>,
    pub outcome: RunOutcome,
}
