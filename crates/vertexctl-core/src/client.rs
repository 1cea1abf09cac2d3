//! HTTP transport for the platform REST surface
//!
//! `AiPlatformClient` owns a pooled `reqwest::Client`, the regional endpoint
//! and the bearer token. Service handlers clone it (the clone is cheap) and
//! issue exactly one request per call; nothing is cached between calls.

use crate::error::{CoreError, Result};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// Location used when none is configured
pub const DEFAULT_LOCATION: &str = "us-central1";

/// User agent string for vertexctl HTTP requests
const DEFAULT_USER_AGENT: &str = concat!("vertexctl-core/", env!("CARGO_PKG_VERSION"));

/// API surface a call is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V1Beta1,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta1 => "v1beta1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regional service endpoint for a location
///
/// ```rust
/// use vertexctl_core::client::endpoint_for_location;
///
/// assert_eq!(
///     endpoint_for_location("europe-west4"),
///     "https://europe-west4-aiplatform.googleapis.com"
/// );
/// assert_eq!(endpoint_for_location("global"), "https://aiplatform.googleapis.com");
/// ```
pub fn endpoint_for_location(location: &str) -> String {
    if location == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{location}-aiplatform.googleapis.com")
    }
}

/// Client handle for the platform API
#[derive(Clone)]
pub struct AiPlatformClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    quota_project: Option<String>,
}

impl fmt::Debug for AiPlatformClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiPlatformClient")
            .field("base_url", &self.inner.base_url)
            .field(
                "access_token",
                &self.inner.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("quota_project", &self.inner.quota_project)
            .finish()
    }
}

/// Builder for [`AiPlatformClient`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    location: Option<String>,
    base_url: Option<String>,
    access_token: Option<String>,
    quota_project: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Region the regional endpoint is derived from
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Explicit endpoint, overriding the one derived from the location
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// OAuth2 bearer token sent with every request
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Project billed for quota (`x-goog-user-project`)
    #[must_use]
    pub fn quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project = Some(project.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Per-request timeout applied by the transport
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<AiPlatformClient> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => endpoint_for_location(self.location.as_deref().unwrap_or(DEFAULT_LOCATION)),
        };
        Url::parse(&base_url)
            .map_err(|e| CoreError::Config(format!("Invalid API endpoint '{base_url}': {e}")))?;

        let mut http = reqwest::Client::builder().user_agent(
            self.user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(AiPlatformClient {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                access_token: self.access_token,
                quota_project: self.quota_project,
            }),
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl AiPlatformClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Endpoint every request path is appended to
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Bearer token, if one was configured
    pub fn access_token(&self) -> Option<&str> {
        self.inner.access_token.as_deref()
    }

    /// Full URL for a resource path such as `projects/p/locations/l/indexes`
    pub fn url(&self, version: ApiVersion, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let raw = format!(
            "{}/{}/{}",
            self.inner.base_url,
            version,
            path.trim_start_matches('/')
        );
        let mut url =
            Url::parse(&raw).map_err(|e| CoreError::Config(format!("Invalid URL '{raw}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(version, path, query)?;
        self.execute(Method::GET, url, None::<&()>).await
    }

    pub async fn post<B, T>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(version, path, query)?;
        self.execute(Method::POST, url, Some(body)).await
    }

    pub async fn patch<B, T>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(version, path, query)?;
        self.execute(Method::PATCH, url, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, version: ApiVersion, path: &str) -> Result<T> {
        let url = self.url(version, path, &[])?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    async fn execute<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, url);

        let mut request = self.inner.http.request(method.clone(), url.clone());
        if let Some(token) = &self.inner.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(project) = &self.inner.quota_project {
            request = request.header("x-goog-user-project", project);
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)?;
            trace!("Request body: {}", String::from_utf8_lossy(&payload));
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!("Response {}: {}", status, text);

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let text = if text.trim().is_empty() { "{}" } else { &text };
        serde_json::from_str(text).map_err(|e| {
            warn!("Could not decode response from {} {}: {}", method, url, e);
            CoreError::Decode(e)
        })
    }
}

fn api_error(status: StatusCode, body: &str) -> CoreError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => CoreError::Api {
            status: status.as_u16(),
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => CoreError::Api {
            status: status.as_u16(),
            code: None,
            message: if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}
