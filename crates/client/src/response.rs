//! Result envelope returned by every API call, and the normalizer that folds
//! any request failure into it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error text used whenever the server gave nothing more specific.
pub const GENERIC_ERROR: &str = "Something went wrong";

/// Why a request did not produce a usable success body.
#[derive(Debug, Error)]
pub enum RequestFailure {
    /// The server answered with a non-2xx status. `data` is the JSON body,
    /// if it had one.
    #[error("server responded with status {status}")]
    Status { status: u16, data: Option<Value> },
    /// No response: connection refused, timeout, TLS, ...
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// A 2xx response whose body could not be read to the end.
    #[error("could not read response body: {0}")]
    Body(#[source] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub status_code: u16,
    /// Always `None`; kept so both variants serialize to the same shape.
    pub error: Option<String>,
    pub message: Option<String>,
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: Option<String>,
    /// Always `None` on errors.
    pub payload: Option<Value>,
    /// `data.data` of a 4xx body, re-serialized.
    pub body: Option<String>,
}

impl ErrorResponse {
    fn generic(status_code: u16) -> Self {
        Self {
            status_code,
            error: GENERIC_ERROR.to_string(),
            message: None,
            payload: None,
            body: None,
        }
    }

    /// Normalize a failure into the error envelope.
    ///
    /// - 404: `errorType`, else `type`
    /// - other 4xx: `errors[0].msg`, else `error`; `message` from `status`
    /// - 5xx and anything else: generic
    /// - no response at all: generic with status 500
    pub fn from_failure(failure: &RequestFailure) -> Self {
        tracing::error!(%failure, "api request failed");

        let (status, data) = match failure {
            RequestFailure::Status { status, data } => (*status, data.as_ref()),
            RequestFailure::Transport(_) | RequestFailure::Body(_) => return Self::generic(500),
        };
        let field = |name: &str| data.and_then(|d| d.get(name)).and_then(Value::as_str);

        match status {
            404 => Self {
                error: field("errorType")
                    .or_else(|| field("type"))
                    .unwrap_or(GENERIC_ERROR)
                    .to_string(),
                ..Self::generic(404)
            },
            400..=499 => {
                let first_error = data
                    .and_then(|d| d.get("errors"))
                    .and_then(Value::as_array)
                    .and_then(|errors| errors.first())
                    .and_then(|e| e.get("msg"))
                    .and_then(Value::as_str);
                Self {
                    status_code: status,
                    error: first_error
                        .or_else(|| field("error"))
                        .unwrap_or(GENERIC_ERROR)
                        .to_string(),
                    message: field("status").map(str::to_string),
                    payload: None,
                    body: data.and_then(|d| d.get("data")).map(Value::to_string),
                }
            }
            _ => Self::generic(status),
        }
    }
}

/// Outcome of an API call. Failures never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(SuccessResponse<T>),
    Error(ErrorResponse),
}

impl<T> ApiResponse<T> {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(s) => s.status_code,
            Self::Error(e) => e.status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(s) => Some(&s.payload),
            Self::Error(_) => None,
        }
    }
}

impl<T> From<Result<SuccessResponse<T>, RequestFailure>> for ApiResponse<T> {
    fn from(result: Result<SuccessResponse<T>, RequestFailure>) -> Self {
        match result {
            Ok(success) => Self::Success(success),
            Err(failure) => Self::Error(ErrorResponse::from_failure(&failure)),
        }
    }
}
