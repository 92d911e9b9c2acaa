//! Connector Framework error types
//!
//! Error definitions with transient/permanent classification. The variants
//! double as the host-facing error taxonomy: a host maps `error_code()` onto
//! its own status codes.

use thiserror::Error;

/// Error that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Connection errors (usually transient)
    /// Failed to establish connection to target system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Target system is temporarily unavailable (rate limited or 5xx).
    #[error("target system unavailable: {message}")]
    TargetUnavailable { message: String },

    // Authentication errors (usually permanent)
    /// Credentials were rejected by the target system.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Insufficient permissions for the operation.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    // Configuration errors (permanent)
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Upstream semantic errors
    /// Object not found in target system.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Target system returned a shape the connector does not understand.
    #[error("unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Operation failed.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Pagination errors
    /// The page token handed back by the host could not be decoded.
    #[error("invalid page token: {message}")]
    InvalidPageToken { message: String },

    /// The continuation link returned by the target system could not be parsed.
    #[error("malformed continuation link '{link}': {message}")]
    MalformedContinuation { link: String, message: String },

    // Data errors
    /// Invalid data produced while mapping upstream records.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Serialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    // Call lifecycle
    /// The host cancelled the call.
    #[error("operation cancelled")]
    Cancelled,

    /// The host deadline elapsed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    // Internal errors
    /// Internal error.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConnectorError {
    /// Check if this error is transient and the operation could be retried.
    ///
    /// Transient errors are those caused by temporary conditions that may resolve
    /// themselves, such as network issues or temporary unavailability.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. } | ConnectorError::TargetUnavailable { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::AuthenticationFailed { .. } => "AUTH_FAILED",
            ConnectorError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::NotFound { .. } => "NOT_FOUND",
            ConnectorError::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            ConnectorError::OperationFailed { .. } => "OPERATION_FAILED",
            ConnectorError::InvalidPageToken { .. } => "INVALID_PAGE_TOKEN",
            ConnectorError::MalformedContinuation { .. } => "MALFORMED_CONTINUATION",
            ConnectorError::InvalidData { .. } => "INVALID_DATA",
            ConnectorError::Serialization { .. } => "SERIALIZATION_ERROR",
            ConnectorError::Cancelled => "CANCELLED",
            ConnectorError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            ConnectorError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    // Convenience constructors

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ConnectorError::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
        }
    }

    /// Create an invalid page token error.
    pub fn invalid_page_token(message: impl Into<String>) -> Self {
        ConnectorError::InvalidPageToken {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ConnectorError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with source.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
