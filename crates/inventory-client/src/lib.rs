//! Inventory Service REST Client
//!
//! A Rust client library for the inventory service that receives Kubernetes
//! discovery events. Provides the wire models for the discovery event
//! envelope and methods to fetch previously reported events, post event
//! batches and post run status.
//!
//! # Example
//!
//! ```no_run
//! use inventory_client::{InventoryClient, InventoryClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InventoryClient::new(
//!     "http://inventory:80".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! client.validate_token().await?;
//!
//! // Baseline for change detection
//! let previous = client.fetch_previous_events("configuration-id").await?;
//!
//! // Batches are posted already serialized
//! client.post_event_batch(serde_json::to_vec(&previous)?).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod inventory_trait;
#[cfg(feature = "test-util")]
pub mod mock;

#[cfg(test)]
mod client_test;

pub use client::InventoryClient;
pub use common::HttpClient;
pub use error::InventoryError;
pub use models::*;
pub use inventory_trait::InventoryClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockInventoryClient;
