//! Per-invocation API construction
//!
//! Each action invocation builds its own [`PipelinesApi`] once credentials are
//! known and drops it when the invocation ends.

use std::sync::Arc;
use std::time::Duration;

use azpipe_client::{ApiVersions, AzureDevOpsClient, PipelinesApi};

use crate::error::{ActionError, Result};

/// Builds an authenticated API handle for one host
pub trait Connector: Send + Sync {
    /// # Arguments
    /// * `host` - Host name or full base URL
    /// * `token` - Personal access token, fixed for the lifetime of the handle
    /// * `versions` - API versions per endpoint
    fn connect(
        &self,
        host: &str,
        token: String,
        versions: ApiVersions,
    ) -> Result<Arc<dyn PipelinesApi>>;
}

/// Time allowed for one HTTP request unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connector that talks HTTP through [`AzureDevOpsClient`]
#[derive(Debug, Clone)]
pub struct HttpConnector {
    /// Per-request timeout; `None` lets a request wait indefinitely
    request_timeout: Option<Duration>,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for HttpConnector {
    fn connect(
        &self,
        host: &str,
        token: String,
        versions: ApiVersions,
    ) -> Result<Arc<dyn PipelinesApi>> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ActionError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Arc::new(AzureDevOpsClient::with_client(
            host, token, versions, http,
        )))
    }
}
