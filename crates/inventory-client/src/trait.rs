//! InventoryClient trait for mocking
//!
//! This trait abstracts the InventoryClient so the event producer can be
//! exercised against an in-memory mock in unit tests.

use crate::error::InventoryError;
use crate::models::DiscoveryEvent;

/// Trait for inventory service operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait InventoryClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), InventoryError>;

    /// Fetch every event previously reported for a configuration.
    ///
    /// Returns an empty list (not an error) when the service has no record.
    async fn fetch_previous_events(&self, configuration_id: &str) -> Result<Vec<DiscoveryEvent>, InventoryError>;

    /// Post a serialized event batch (JSON array of events)
    async fn post_event_batch(&self, batch: Vec<u8>) -> Result<(), InventoryError>;

    /// Post a serialized run status update
    async fn post_status(&self, status: Vec<u8>) -> Result<(), InventoryError>;
}
