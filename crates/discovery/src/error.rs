//! Discovery engine error types.

use inventory_client::InventoryError;
use thiserror::Error;

/// Errors that abort a discovery run.
///
/// There is no partial-success variant: when any of these is returned,
/// nothing from the run has been sent.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// An entity or the event batch could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The inventory service rejected or failed a call
    #[error("Transport error: {0}")]
    Transport(#[from] InventoryError),
}
