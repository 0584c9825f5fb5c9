//! IonQ REST API client.
//!
//! Implements the IonQ v0.1 jobs API (`https://api.ionq.co/v0.1/jobs`) for
//! submitting circuits, polling job status and cancelling jobs.
//!
//! The HTTP layer sits behind the [`Transport`] trait so the job logic can be
//! driven by a scripted transport in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use arvak_hal::JobStatus;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::circuit::IonqCircuit;
use crate::error::{IonqError, IonqResult};

/// IonQ cloud API base URL.
pub const BASE_URL: &str = "https://api.ionq.co/v0.1";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// One call against the jobs API, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Raw response: HTTP status and parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// A 200 response with the given body.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Moves requests to the IonQ endpoint and back.
///
/// Implementations return the JSON body for any HTTP status; the caller
/// inspects `error` fields itself. A body that is not JSON, or an endpoint
/// that cannot be reached, is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> IonqResult<ApiResponse>;
}

/// [`Transport`] over HTTPS with `reqwest`.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> IonqResult<Self> {
        Self::with_base_url(BASE_URL, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport targeting a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> IonqResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(IonqError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// IonQ uses `Authorization: apiKey <key>`.
    fn auth_header(&self) -> String {
        format!("apiKey {}", self.api_key)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> IonqResult<ApiResponse> {
        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));
        debug!("{} {}", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };
        let mut builder = builder
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json");
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                IonqError::Connection(format!("{} {}: {}", request.method, url, e))
            } else {
                IonqError::Http(e)
            }
        })?;

        let status = resp.status();
        let text = resp.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Ok(ApiResponse {
                status: status.as_u16(),
                body,
            }),
            Err(_) if status.is_success() => Err(IonqError::MalformedResponse(format!(
                "non-JSON body from {url}"
            ))),
            Err(_) => Err(IonqError::ApiError {
                status: status.as_u16(),
                message: text,
            }),
        }
    }
}

/// Typed client for the jobs endpoints.
#[derive(Clone)]
pub struct IonqClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for IonqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IonqClient").finish_non_exhaustive()
    }
}

impl IonqClient {
    /// Wrap a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call(&self, request: ApiRequest) -> IonqResult<JobResponse> {
        let response = self.transport.send(request).await?;
        let mut job: JobResponse = serde_json::from_value(response.body.clone())?;

        if matches!(response.status, 401 | 403) {
            return Err(IonqError::ApiError {
                status: response.status,
                message: job
                    .error_message()
                    .unwrap_or_else(|| response.body.to_string()),
            });
        }
        job.http_status = Some(response.status);
        Ok(job)
    }

    /// Submit a job. The response may carry an `error` field instead of an id.
    ///
    /// Non-2xx replies other than 401/403 are returned for the caller to
    /// classify; see [`JobResponse::rejected_status`].
    #[instrument(skip(self, req), fields(name = %req.name, target = %req.target))]
    pub async fn submit_job(&self, req: &SubmitRequest) -> IonqResult<JobResponse> {
        debug!("Submitting IonQ job {} ({} shots)", req.name, req.shots);
        self.call(ApiRequest {
            method: Method::Post,
            path: "jobs/".into(),
            body: Some(serde_json::to_value(req)?),
        })
        .await
    }

    /// Fetch the current state of a job.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> IonqResult<JobResponse> {
        debug!("Getting IonQ job: {}", job_id);
        let job = self
            .call(ApiRequest {
                method: Method::Get,
                path: format!("jobs/{job_id}"),
                body: None,
            })
            .await?;
        if let Some(status) = job.rejected_status() {
            return Err(IonqError::ApiError {
                status,
                message: job
                    .error_message()
                    .unwrap_or_else(|| format!("could not fetch job {job_id}")),
            });
        }
        Ok(job)
    }

    /// Request cancellation of a job. Classified like [`Self::submit_job`].
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, job_id: &str) -> IonqResult<JobResponse> {
        debug!("Cancelling IonQ job: {}", job_id);
        self.call(ApiRequest {
            method: Method::Put,
            path: format!("jobs/{job_id}/status/cancel"),
            body: None,
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST jobs/`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    /// Always `"json"`.
    pub lang: &'static str,
    pub body: IonqCircuit,
    /// Device name (`qpu` or `simulator`).
    pub target: String,
    pub shots: u32,
    pub name: String,
}

impl SubmitRequest {
    pub fn new(
        body: IonqCircuit,
        target: impl Into<String>,
        shots: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            lang: "json",
            body,
            target: target.into(),
            shots,
            name: name.into(),
        }
    }
}

/// Job record returned by every jobs endpoint.
///
/// All fields are optional: a submission may answer with only `error`, a
/// pending job has no `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Width of the histogram keys.
    #[serde(default)]
    pub qubits: Option<u32>,
    #[serde(default)]
    pub data: Option<JobData>,
    /// Either a string or an object with a `message`.
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub failure: Option<Failure>,
    /// HTTP status the record arrived with.
    #[serde(skip)]
    pub http_status: Option<u16>,
}

/// Result payload of a completed job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobData {
    /// Basis-state index (decimal string) to probability.
    #[serde(default)]
    pub histogram: Option<BTreeMap<String, f64>>,
}

/// Failure detail of a failed job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl JobResponse {
    /// Text of the top-level `error` field, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => Some(
                obj.get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| Value::Object(obj.clone()).to_string(), str::to_string),
            ),
            other => Some(other.to_string()),
        }
    }

    /// HTTP status of a reply outside the 2xx range.
    pub fn rejected_status(&self) -> Option<u16> {
        self.http_status.filter(|s| !(200..300).contains(s))
    }

    /// Best description of why a job failed.
    pub fn failure_message(&self) -> Option<String> {
        self.failure
            .as_ref()
            .and_then(|f| f.error.clone())
            .or_else(|| self.error_message())
    }

    /// Parsed remote status.
    pub fn remote_status(&self) -> IonqResult<RemoteStatus> {
        self.status
            .as_deref()
            .ok_or_else(|| IonqError::MalformedResponse("job response has no status".into()))?
            .parse()
    }

    /// Status in the shared vocabulary.
    pub fn job_status(&self) -> IonqResult<JobStatus> {
        Ok(match self.remote_status()? {
            RemoteStatus::Ready => JobStatus::Submitted,
            RemoteStatus::Running => JobStatus::Running,
            RemoteStatus::Completed => JobStatus::Completed,
            RemoteStatus::Canceled => JobStatus::Cancelled,
            RemoteStatus::Failed => JobStatus::Error(
                self.failure_message()
                    .unwrap_or_else(|| "job failed without detail".into()),
            ),
        })
    }
}

/// Job status as reported by IonQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Ready,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl FromStr for RemoteStatus {
    type Err = IonqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(RemoteStatus::Ready),
            "running" => Ok(RemoteStatus::Running),
            "completed" => Ok(RemoteStatus::Completed),
            "failed" => Ok(RemoteStatus::Failed),
            "canceled" => Ok(RemoteStatus::Canceled),
            other => Err(IonqError::UnknownStatus(other.to_string())),
        }
    }
}
