use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error as _;
use tracing::{debug, info, instrument, warn};

use super::retry::RetryPolicy;
use super::types::{CreateSessionRequest, CreateSessionResponse, SessionStatusResponse};
use crate::domain::errors::ApiError;
use crate::domain::models::{
    Availability, Cancellation, Config, Submission, TaskSnapshot, RATE_LIMITED_TASK_ID,
};
use crate::domain::ports::TaskApi;

/// HTTP client for the remote task API
///
/// Every operation runs through the configured [`RetryPolicy`]. Remote
/// states that are expected but exceptional (429 on submit, 404 on status,
/// cancel and optional endpoints) come back as tagged values, not errors.
#[derive(Debug, Clone)]
pub struct RemoteTaskClient {
    /// Reusable HTTP client with connection pooling
    http: ReqwestClient,
    base_url: String,
    sessions_url: Url,
    admin_base_url: String,
    auth_token: Option<String>,
    snapshot_id: Option<String>,
    metrics_endpoint: String,
    logs_endpoint: String,
    retry_policy: RetryPolicy,
}

impl RemoteTaskClient {
    /// Create a client from the harness configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = ReqwestClient::builder()
            .timeout(config.api.request_timeout())
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()?;
        let base_url = config.api.base_url.trim_end_matches('/').to_string();
        let sessions_url = sessions_url(&base_url)?;

        Ok(Self {
            http,
            base_url,
            sessions_url,
            admin_base_url: config.admin.base_url.trim_end_matches('/').to_string(),
            auth_token: config.api.auth_token.clone(),
            snapshot_id: config.api.snapshot_id.clone(),
            metrics_endpoint: config.observability.metrics_endpoint.clone(),
            logs_endpoint: config.observability.logs_endpoint.clone(),
            retry_policy: RetryPolicy::from_config(&config.retry),
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Submit a task description
    ///
    /// The description is sent as-is; the remote service decides whether it
    /// is acceptable. A 429 answer yields [`Submission::RateLimited`] and is
    /// never retried.
    #[instrument(skip(self, description), fields(description_len = description.len()))]
    pub async fn submit_task(&self, description: &str) -> Result<Submission, ApiError> {
        let url = self.sessions_url.as_str();
        let body = CreateSessionRequest {
            prompt: description,
            snapshot_id: self.snapshot_id.as_deref(),
        };

        let submission = self
            .retry_policy
            .execute("submit_task", || self.submit_once(url, &body))
            .await?;

        match &submission {
            Submission::Accepted(handle) => info!(task_id = %handle.task_id, "task submitted"),
            Submission::RateLimited => warn!("submission rate limited"),
        }
        Ok(submission)
    }

    /// Read the status of a task
    ///
    /// The rate-limited sentinel id is answered locally. A 404 yields a
    /// `not_found` snapshot.
    #[instrument(skip(self))]
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        if task_id == RATE_LIMITED_TASK_ID {
            debug!("answering status of rate-limited submission locally");
            return Ok(TaskSnapshot::rate_limited_mock());
        }

        let url = self.session_url(task_id);
        self.retry_policy
            .execute("get_task_status", || self.status_once(url.as_str(), task_id))
            .await
    }

    /// Cancel a task; a task that is already gone counts as cancelled
    #[instrument(skip(self))]
    pub async fn cancel_task(&self, task_id: &str) -> Result<Cancellation, ApiError> {
        if task_id == RATE_LIMITED_TASK_ID {
            return Ok(Cancellation::AlreadyGone);
        }

        let url = self.session_url(task_id);
        self.retry_policy
            .execute("cancel_task", || self.cancel_once(url.as_str()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_metrics(&self) -> Result<Availability<Value>, ApiError> {
        let url = format!("{}/v1{}", self.base_url, self.metrics_endpoint);
        self.retry_policy
            .execute("get_metrics", || self.read_optional_once(&url))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_logs(&self) -> Result<Availability<Value>, ApiError> {
        let url = format!("{}/v1{}", self.base_url, self.logs_endpoint);
        self.retry_policy
            .execute("get_logs", || self.read_optional_once(&url))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_admin_status(&self) -> Result<Availability<Value>, ApiError> {
        let url = format!("{}/v1/status", self.admin_base_url);
        self.retry_policy
            .execute("get_admin_status", || self.read_optional_once(&url))
            .await
    }

    /// URL of one session; the id is percent-encoded as a single path segment
    fn session_url(&self, task_id: &str) -> Url {
        let mut url = self.sessions_url.clone();
        // `sessions_url` is checked to be a base URL on construction
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(task_id);
        }
        url
    }

    /// Build an authorized request
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn submit_once(
        &self,
        url: &str,
        body: &CreateSessionRequest<'_>,
    ) -> Result<Submission, ApiError> {
        let response = self.request(Method::POST, url).json(body).send().await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Ok(Submission::RateLimited),
            status if status.is_success() => {
                let created: CreateSessionResponse = read_json(response).await?;
                Ok(Submission::Accepted(created.into()))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn status_once(&self, url: &str, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        let response = self.request(Method::GET, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(TaskSnapshot::not_found(task_id)),
            status if status.is_success() => {
                let body: SessionStatusResponse = read_json(response).await?;
                Ok(body.into_snapshot(task_id))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn cancel_once(&self, url: &str) -> Result<Cancellation, ApiError> {
        let response = self.request(Method::DELETE, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Cancellation::AlreadyGone),
            status if status.is_success() => Ok(Cancellation::Cancelled),
            _ => Err(status_error(response).await),
        }
    }

    async fn read_optional_once(&self, url: &str) -> Result<Availability<Value>, ApiError> {
        let response = match self.request(Method::GET, url).send().await {
            Ok(response) => response,
            Err(err) if is_dns_failure(&err) => {
                debug!(url, error = %err, "endpoint host did not resolve");
                return Ok(Availability::Unavailable);
            }
            Err(err) => return Err(err.into()),
        };

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Availability::Unavailable),
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                if bytes.is_empty() {
                    return Ok(Availability::Available(Value::Null));
                }
                Ok(Availability::Available(serde_json::from_slice(&bytes)?))
            }
            _ => Err(status_error(response).await),
        }
    }
}

#[async_trait]
impl TaskApi for RemoteTaskClient {
    async fn submit_task(&self, description: &str) -> Result<Submission, ApiError> {
        Self::submit_task(self, description).await
    }

    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        Self::get_task_status(self, task_id).await
    }

    async fn cancel_task(&self, task_id: &str) -> Result<Cancellation, ApiError> {
        Self::cancel_task(self, task_id).await
    }
}

fn sessions_url(base_url: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let url = Url::parse(&format!("{base_url}/v1/sessions")).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    ApiError::Status { status, body }
}

/// Check whether a request failed because the host name did not resolve
fn is_dns_failure(err: &reqwest::Error) -> bool {
    if !err.is_connect() {
        return false;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> RemoteTaskClient {
        let mut config = Config::default();
        config.api.base_url = base_url.to_string();
        RemoteTaskClient::new(&config).unwrap()
    }

    #[test]
    fn test_session_url_encodes_task_id() {
        let client = client("http://tasks.test/");
        assert_eq!(
            client.session_url("task-1").as_str(),
            "http://tasks.test/v1/sessions/task-1"
        );
        assert_eq!(
            client.session_url("a/b?c#d").as_str(),
            "http://tasks.test/v1/sessions/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_session_url_keeps_base_path() {
        let client = client("http://tasks.test/api");
        assert_eq!(
            client.session_url("t").as_str(),
            "http://tasks.test/api/v1/sessions/t"
        );
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        let err = RemoteTaskClient::new(&config).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
        assert!(!err.is_transient());
    }
}
