//! Scanner-specific error types.
//!
//! Wraps the errors of every collaborator a scan run touches so `main` can
//! report a single failure upstream.

use discovery::DiscoveryError;
use extractor::ExtractError;
use inventory_client::InventoryError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the inventory scanner.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Inventory service error outside of event production
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Classification, serialization or batch transport failed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// A cluster object could not be flattened into an entity
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
