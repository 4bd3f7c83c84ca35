//! Error types for the telemetry ingestion service

use hyper::StatusCode;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the telemetry ingestion service
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Store Errors
    // =========================================================================
    /// Caller violated the store contract (e.g. empty equipment identifier)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid store or server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Request body exceeds the accepted size
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// No data for the requested resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Known route, unsupported method
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Prometheus registry or encoder error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// HTTP status the transport reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::Config(_)
            | Error::Internal(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is the client's fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

// =============================================================================
// Tests
// =============================================================================
