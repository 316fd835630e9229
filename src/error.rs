use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single dashboard operation.
///
/// Every variant is locally recoverable: the caller records it under an
/// operation key and the UI surface that triggered it stays usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status { status: u16, detail: Option<String> },

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Message shown to the user: server-provided detail verbatim when there
    /// is one, the validation text for local failures, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ApiError::Validation(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Maps the error onto the response the proxy routes send back.
    pub fn into_proxy_response(self, fallback: &str) -> (StatusCode, Json<ErrorBody>) {
        let status = match &self {
            ApiError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Transport(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        let error = self.user_message(fallback);
        (status, Json(ErrorBody { error }))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Body of a failed proxy response.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
struct DetailBody {
    detail: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

/// Pulls `detail` (or `error`) out of a non-2xx body, if it is a string.
pub fn detail_from_body(body: &[u8]) -> Option<String> {
    let parsed: DetailBody = serde_json::from_slice(body).ok()?;
    [parsed.detail, parsed.error]
        .into_iter()
        .flatten()
        .find_map(|v| match v {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
}
