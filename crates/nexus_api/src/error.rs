use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NexusApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0} {1}")]
    Status(StatusCode, String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("health check failed: {0}")]
    Unhealthy(String),
}

impl NexusApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status, _) => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

/// FastAPI error body: `{"detail": "..."}` or `{"detail": [{"msg": "..."}]}`.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    detail: Option<Value>,
}

pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.detail)
        .and_then(|detail| detail_message(&detail));

    if let Some(message) = detail {
        return message;
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) => non_empty(text),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|msg| !msg.trim().is_empty())
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
