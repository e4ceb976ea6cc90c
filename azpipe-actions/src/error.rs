//! Error types for template actions

use std::time::Duration;

use azpipe_client::ClientError;
use thiserror::Error;

/// Result type alias for action operations
pub type Result<T> = std::result::Result<T, ActionError>;

/// Errors raised while preparing or performing a template action
#[derive(Debug, Error)]
pub enum ActionError {
    /// No matching host integration, or no token for it
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Action input is missing a field or has a malformed value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Azure DevOps answered with a non-success status
    #[error("Request failed. Status code {status}.")]
    RemoteRequest {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// A run reported a status outside `notStarted`, `inProgress` and `completed`
    #[error("Azure pipeline failed with status: {0}.")]
    UnexpectedStatus(String),

    /// No response arrived (connection, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response arrived but did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Polling was cancelled before the run reached a terminal state
    #[error("Polling of the Azure pipeline run was cancelled.")]
    Cancelled,

    /// The run did not reach a terminal state within the allowed time
    #[error("Azure pipeline run did not complete within {0:?}.")]
    DeadlineExceeded(Duration),

    /// No action is registered under this id
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl ActionError {
    /// Whether this error must fail the action instead of being logged
    ///
    /// Only problems detected before any network call abort an action.
    pub fn aborts_action(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidInput(_) | Self::UnknownAction(_)
        )
    }

    /// HTTP status code for remote failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for ActionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, message } => Self::RemoteRequest { status, message },
            ClientError::RequestFailed(e) => match e.status() {
                Some(status) => Self::RemoteRequest {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => Self::Transport(e.to_string()),
            },
            ClientError::ParseError(message) => Self::MalformedResponse(message),
            ClientError::InvalidUrl(message) => Self::Configuration(message),
        }
    }
}
