//! Error types for the Opsgenie connector.

use serde::Deserialize;
use thiserror::Error;
use xavyo_connector::error::ConnectorError;

/// Result type alias using `OpsgenieError`.
pub type OpsgenieResult<T> = Result<T, OpsgenieError>;

/// Error body returned by the Opsgenie API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub took: f64,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
}

/// Errors that can occur when talking to Opsgenie.
#[derive(Debug, Error)]
pub enum OpsgenieError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success response from the Opsgenie API.
    #[error("Opsgenie API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    /// The API answered with a shape the connector does not understand.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Framework-level failure (cancellation, deadline, page state).
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl OpsgenieError {
    /// Build an API error from a non-success status and the raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => OpsgenieError::Api {
                status,
                message: parsed.message,
                request_id: parsed.request_id,
            },
            Err(_) => OpsgenieError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.to_string()
                },
                request_id: None,
            },
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpsgenieError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert into the host error taxonomy, naming the failed operation.
    pub fn for_operation(self, operation: &str) -> ConnectorError {
        match self {
            OpsgenieError::Config(message) => ConnectorError::InvalidConfiguration {
                message: format!("{operation}: {message}"),
            },
            OpsgenieError::Http(err) if err.is_decode() => ConnectorError::UnexpectedResponse {
                message: format!("{operation}: {err}"),
            },
            OpsgenieError::Http(err) => {
                ConnectorError::connection_failed_with_source(format!("{operation}: {err}"), err)
            }
            OpsgenieError::Json(err) => ConnectorError::UnexpectedResponse {
                message: format!("{operation}: invalid response body: {err}"),
            },
            OpsgenieError::Url(err) => {
                ConnectorError::internal_with_source(format!("{operation}: bad URL"), err)
            }
            OpsgenieError::Api {
                status,
                message,
                request_id,
            } => {
                let message = match request_id {
                    Some(id) => format!("{operation}: {message} (request {id})"),
                    None => format!("{operation}: {message}"),
                };
                match status {
                    401 => ConnectorError::AuthenticationFailed { message },
                    403 => ConnectorError::AuthorizationFailed {
                        operation: operation.to_string(),
                    },
                    404 => ConnectorError::NotFound { message },
                    429 | 500..=599 => ConnectorError::TargetUnavailable { message },
                    _ => ConnectorError::operation_failed(format!("HTTP {status}: {message}")),
                }
            }
            OpsgenieError::UnexpectedResponse(message) => ConnectorError::UnexpectedResponse {
                message: format!("{operation}: {message}"),
            },
            OpsgenieError::Connector(err) => err,
        }
    }
}
