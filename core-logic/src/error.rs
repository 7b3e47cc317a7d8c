//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid base URL format: '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to load configuration from '{path}': {msg}")]
    LoadFailed { path: String, msg: String },
}

/// Network and HTTP-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Connection failed to {endpoint}: {reason}")]
    ConnectionRefused { endpoint: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl NetworkError {
    /// Endpoint the failing request was addressed to.
    pub fn endpoint(&self) -> &str {
        match self {
            NetworkError::Timeout { endpoint, .. }
            | NetworkError::ConnectionRefused { endpoint, .. }
            | NetworkError::HttpError { endpoint, .. }
            | NetworkError::InvalidResponse { endpoint, .. } => endpoint,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Timeout { .. })
    }
}
