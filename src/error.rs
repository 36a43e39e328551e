//! Proxy Error Types
//!
//! Error taxonomy for the dispatcher and key rotation layers, with the
//! HTTP status mapping applied at the response boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Main error type for proxy operations
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Configuration errors (invalid JSON, missing fields, unreadable files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested path does not map to a known upstream service
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// Key pool for the service is empty
    #[error("No {0} API keys available")]
    NoKeysAvailable(String),

    /// Transport-level failure talking to the upstream API
    #[error("Upstream request to {service} failed: {message}")]
    Upstream {
        /// Display name of the upstream service
        service: String,
        /// Underlying transport error
        message: String,
    },

    /// Upstream returned a body that could not be parsed as JSON
    #[error("Failed to parse {service} response: {message}")]
    Response {
        /// Display name of the upstream service
        service: String,
        /// Underlying decode error
        message: String,
    },

    /// Upstream call exceeded the client timeout
    #[error("Request to {service} timed out: {message}")]
    Timeout {
        /// Display name of the upstream service
        service: String,
        /// Underlying timeout error
        message: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Classify a reqwest error for a named service
    pub fn from_upstream(service: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout {
                service: service.to_string(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ProxyError::Response {
                service: service.to_string(),
                message: err.to_string(),
            }
        } else {
            ProxyError::Upstream {
                service: service.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// HTTP status for this error at the response boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::UnknownService(_) => StatusCode::NOT_FOUND,
            ProxyError::NoKeysAvailable(_) => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Config(_)
            | ProxyError::Upstream { .. }
            | ProxyError::Response { .. }
            | ProxyError::Timeout { .. }
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client. Transport and parse failures get a
    /// generic message; the underlying cause stays in the server logs.
    fn public_message(&self) -> String {
        match self {
            ProxyError::UnknownService(name) => format!("Unknown service: {}", name),
            ProxyError::NoKeysAvailable(service) => {
                format!("No {} API keys available", service)
            }
            ProxyError::Upstream { service, .. }
            | ProxyError::Response { service, .. }
            | ProxyError::Timeout { service, .. } => {
                format!("Error calling {} API", service)
            }
            ProxyError::Config(_) | ProxyError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        ProxyError::Internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::Config(format!("IO error: {}", err))
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ProxyError::NoKeysAvailable(service) => {
                warn!(service = %service, "key pool exhausted");
            }
            ProxyError::UnknownService(name) => {
                warn!(service = %name, "unknown service requested");
            }
            _ => {
                error!(error = %self, "dispatch failed");
            }
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;
