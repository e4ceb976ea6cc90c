//! Azpipe HTTP Client
//!
//! A small, type-safe client for the parts of the Azure DevOps REST API that
//! the pipeline template actions need: creating pipelines, updating pipeline
//! permissions, queueing runs and reading build status.
//!
//! # Example
//!
//! ```no_run
//! use azpipe_client::{ApiVersions, AzureDevOpsClient};
//! use azpipe_core::domain::ProjectRef;
//! use azpipe_core::domain::run::PipelineRunRequest;
//! use azpipe_core::dto::run::RunPipelineRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AzureDevOpsClient::new("dev.azure.com", "my-pat", ApiVersions::default());
//!     let project = ProjectRef::new("contoso", "platform");
//!
//!     let request = PipelineRunRequest::new("main");
//!     let run = client
//!         .run_pipeline(&project, 12, &RunPipelineRequest::from(&request))
//!         .await?;
//!
//!     println!("Queued run {}", run.id);
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod pipelines;
mod runs;

pub use api::PipelinesApi;
pub use error::{ClientError, Result};

use azpipe_core::domain::ProjectRef;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Default Azure DevOps host
pub const DEFAULT_HOST: &str = "dev.azure.com";

/// Username paired with a personal access token in the Basic auth header
const PAT_USERNAME: &str = "PAT";

/// Header that stops Azure DevOps from redirecting unauthenticated calls to a sign-in page
const FED_AUTH_REDIRECT_HEADER: &str = "X-TFS-FedAuthRedirect";

/// API version used for each endpoint
///
/// Azure DevOps versions every endpoint independently, so each call carries
/// its own version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersions {
    /// `POST _apis/pipelines`
    pub create: String,
    /// `PATCH _apis/pipelines/pipelinepermissions/...`
    pub permits: String,
    /// `POST _apis/pipelines/{id}/runs`
    pub run: String,
    /// `GET _apis/build/builds/{id}`
    pub build: String,
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            create: "6.1-preview.1".to_string(),
            permits: "7.1-preview.1".to_string(),
            run: "7.0".to_string(),
            build: "6.1-preview.6".to_string(),
        }
    }
}

/// HTTP client for one Azure DevOps host, authenticated with one token
///
/// The token is fixed for the lifetime of the client; actions build a fresh
/// client per invocation and reuse it for every call they make.
#[derive(Clone)]
pub struct AzureDevOpsClient {
    /// Base URL of the service (e.g., "https://dev.azure.com")
    base_url: String,
    /// Personal access token
    token: String,
    /// Per-endpoint API versions
    versions: ApiVersions,
    /// HTTP client instance
    client: Client,
}

impl AzureDevOpsClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `host` - Host name (e.g., "dev.azure.com"); a value that already has a
    ///   scheme is used as the full base URL
    /// * `token` - Personal access token
    /// * `versions` - API versions per endpoint
    ///
    /// # Example
    /// ```
    /// use azpipe_client::{ApiVersions, AzureDevOpsClient};
    ///
    /// let client = AzureDevOpsClient::new("dev.azure.com", "pat", ApiVersions::default());
    /// assert_eq!(client.base_url(), "https://dev.azure.com");
    /// ```
    pub fn new(host: impl AsRef<str>, token: impl Into<String>, versions: ApiVersions) -> Self {
        Self::with_client(host, token, versions, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        host: impl AsRef<str>,
        token: impl Into<String>,
        versions: ApiVersions,
        client: Client,
    ) -> Self {
        Self {
            base_url: base_url_for(host.as_ref()),
            token: token.into(),
            versions,
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API versions this client sends
    pub fn versions(&self) -> &ApiVersions {
        &self.versions
    }

    /// Build a project-scoped API URL
    ///
    /// `segments` follow `_apis/`. Every segment is percent-encoded, so a
    /// `/`, `?` or `#` inside a name stays inside that segment.
    pub fn api_url(&self, project: &ProjectRef, segments: &[&str], api_version: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&project.organization)
            .push(&project.project)
            .push("_apis")
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// Start a request carrying the authentication headers
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(PAT_USERNAME, Some(&self.token))
            .header(FED_AUTH_REDIRECT_HEADER, "Suppress")
            .header(reqwest::header::ACCEPT, "application/json")
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("versions", &self.versions)
            .finish()
    }
}

/// Turn a host setting into a base URL
///
/// Bare host names are served over HTTPS. A path after the host, such as a
/// collection prefix, is kept.
pub fn base_url_for(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Host (and explicit port) a server setting points at
///
/// `https://tfs.fabrikam.com/tfs`, `tfs.fabrikam.com/tfs` and
/// `tfs.fabrikam.com` all name `tfs.fabrikam.com`.
pub fn authority_for(server: &str) -> String {
    let parsed = Url::parse(&base_url_for(server)).ok();
    match parsed.as_ref().and_then(|url| url.host_str().map(|host| (host, url.port()))) {
        Some((host, Some(port))) => format!("{}:{}", host, port),
        Some((host, None)) => host.to_string(),
        None => server.trim().to_string(),
    }
}
