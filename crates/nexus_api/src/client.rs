use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::NexusApiConfig;
use crate::error::{parse_error_message, NexusApiError};
use crate::headers::build_headers;
use crate::payload::{ChatRequest, HealthStatus};
use crate::url::{normalize_chat_url, normalize_health_url};

/// Raw response body chunks, in arrival order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, NexusApiError>>;

#[derive(Debug, Clone)]
pub struct NexusApiClient {
    http: Client,
    config: NexusApiConfig,
}

impl NexusApiClient {
    pub fn new(config: NexusApiConfig) -> Result<Self, NexusApiError> {
        validate_base_url(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &NexusApiConfig {
        &self.config
    }

    pub fn chat_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn health_endpoint(&self) -> String {
        normalize_health_url(&self.config.base_url)
    }

    pub fn build_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, NexusApiError> {
        let headers = build_headers(&self.config, user_agent)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    NexusApiError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    NexusApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, NexusApiError> {
        if request.message.trim().is_empty() {
            return Err(NexusApiError::EmptyMessage);
        }

        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        Ok(self
            .http
            .post(self.chat_endpoint())
            .headers(headers)
            .json(request))
    }

    /// Sends the request once and resolves when response headers arrive.
    ///
    /// Non-success statuses are reported with the server's error detail.
    pub async fn send(&self, request: &ChatRequest) -> Result<Response, NexusApiError> {
        let response = self.build_request(request)?.send().await?;
        ensure_success(response).await
    }

    /// Opens the chat stream and yields the body as raw chunks.
    ///
    /// Chunk boundaries are whatever the network delivers; nothing here
    /// assumes they align with records.
    pub async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, NexusApiError> {
        let response = self.send(request).await?;
        debug!(
            status = response.status().as_u16(),
            endpoint = %response.url(),
            "chat stream opened"
        );
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(NexusApiError::from));
        Ok(stream.boxed())
    }

    pub async fn health(&self) -> Result<HealthStatus, NexusApiError> {
        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        let response = self
            .http
            .get(self.health_endpoint())
            .headers(headers)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let status = serde_json::from_str::<HealthStatus>(&body)?;
        if !status.is_ok() {
            return Err(NexusApiError::Unhealthy(status.status));
        }
        Ok(status)
    }
}

async fn ensure_success(response: Response) -> Result<Response, NexusApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(status, &body);
    warn!(status = status.as_u16(), %message, "backend rejected request");
    Err(NexusApiError::Status(status, message))
}

fn validate_base_url(base_url: &str) -> Result<(), NexusApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(())
    } else {
        Err(NexusApiError::InvalidBaseUrl(trimmed.to_owned()))
    }
}
