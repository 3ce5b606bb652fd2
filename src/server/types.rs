//! HTTP API Request/Response Types
//!
//! JSON-serializable types for the HTTP API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/archive-search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Search text; the configured default query when absent
    pub query: Option<String>,
    /// Page number as sent by the client, validated by the handler
    pub page: Option<String>,
}

/// Query string of `GET /api/archive-item`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemParams {
    /// Absolute URL of an archive detail page
    pub url: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the service is healthy
    pub healthy: bool,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn upstream_failure(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_FAILURE", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }
}
