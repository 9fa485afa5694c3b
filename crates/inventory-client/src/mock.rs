//! Mock InventoryClient for unit testing
//!
//! Stores previous events in memory and records every batch and status
//! posted, so tests can assert on exactly what would have gone over the wire.

use crate::error::InventoryError;
use crate::inventory_trait::InventoryClientTrait;
use crate::models::{DiscoveryEvent, ScanStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock InventoryClient for testing
#[derive(Debug, Clone, Default)]
pub struct MockInventoryClient {
    pub(crate) base_url: String,
    pub(crate) previous_events: Arc<Mutex<HashMap<String, Vec<DiscoveryEvent>>>>,
    pub(crate) posted_batches: Arc<Mutex<Vec<Vec<u8>>>>,
    pub(crate) posted_statuses: Arc<Mutex<Vec<Vec<u8>>>>,
    // Injected failures, returned as InventoryError::Api
    pub(crate) fetch_error: Arc<Mutex<Option<String>>>,
    pub(crate) batch_error: Arc<Mutex<Option<String>>>,
    pub(crate) status_error: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockInventoryClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Seed the previous events for a configuration (for test setup)
    pub fn set_previous_events(&self, configuration_id: &str, events: Vec<DiscoveryEvent>) {
        lock(&self.previous_events).insert(configuration_id.to_string(), events);
    }

    /// Make every subsequent fetch fail with the given message
    pub fn fail_fetches(&self, message: impl Into<String>) {
        *lock(&self.fetch_error) = Some(message.into());
    }

    /// Make every subsequent batch post fail with the given message
    pub fn fail_batch_posts(&self, message: impl Into<String>) {
        *lock(&self.batch_error) = Some(message.into());
    }

    /// Make every subsequent status post fail with the given message
    pub fn fail_status_posts(&self, message: impl Into<String>) {
        *lock(&self.status_error) = Some(message.into());
    }

    /// Number of batch posts that reached the mock (successful or not)
    pub fn batch_post_count(&self) -> usize {
        lock(&self.posted_batches).len()
    }

    /// Raw bytes of every posted batch, in order
    pub fn raw_batches(&self) -> Vec<Vec<u8>> {
        lock(&self.posted_batches).clone()
    }

    /// Every posted batch decoded back into events
    pub fn posted_batches(&self) -> Result<Vec<Vec<DiscoveryEvent>>, InventoryError> {
        lock(&self.posted_batches)
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(InventoryError::Serialization))
            .collect()
    }

    /// Every posted status decoded
    pub fn posted_statuses(&self) -> Result<Vec<ScanStatus>, InventoryError> {
        lock(&self.posted_statuses)
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(InventoryError::Serialization))
            .collect()
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for MockInventoryClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), InventoryError> {
        Ok(())
    }

    async fn fetch_previous_events(&self, configuration_id: &str) -> Result<Vec<DiscoveryEvent>, InventoryError> {
        if let Some(message) = lock(&self.fetch_error).clone() {
            return Err(InventoryError::Api(message));
        }
        Ok(lock(&self.previous_events)
            .get(configuration_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn post_event_batch(&self, batch: Vec<u8>) -> Result<(), InventoryError> {
        lock(&self.posted_batches).push(batch);
        match lock(&self.batch_error).clone() {
            Some(message) => Err(InventoryError::Api(message)),
            None => Ok(()),
        }
    }

    async fn post_status(&self, status: Vec<u8>) -> Result<(), InventoryError> {
        lock(&self.posted_statuses).push(status);
        match lock(&self.status_error).clone() {
            Some(message) => Err(InventoryError::Api(message)),
            None => Ok(()),
        }
    }
}
