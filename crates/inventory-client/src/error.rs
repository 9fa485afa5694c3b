//! Inventory client errors

use thiserror::Error;

/// Errors that can occur when interacting with the inventory service
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Inventory service returned a non-success status
    #[error("Inventory API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., empty configuration id)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
