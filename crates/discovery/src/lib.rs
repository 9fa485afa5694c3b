//! Kubernetes Inventory Discovery Engine
//!
//! Turns a freshly polled set of cluster entities and the previously
//! reported discovery events into the minimal batch of events that brings
//! the inventory service up to date.
//!
//! - `identity`: stable SHA-256 identity per real-world object
//! - `fingerprint`: canonical content hash used to detect "no change"
//! - `classifier`: created / updated / unchanged / deleted partition
//! - `event`: discovery event envelope construction
//! - `producer`: orchestration and the single outbound batch call
//!
//! # Example
//!
//! ```no_run
//! use discovery::{EventProducer, Scope, WorkloadEntity};
//! use inventory_client::InventoryClient;
//! use std::sync::Arc;
//!
//! # async fn example(workloads: Vec<WorkloadEntity>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = InventoryClient::new("http://inventory:80".to_string(), "token".to_string())?;
//! let producer = EventProducer::new(Arc::new(client), Scope::new("workspace", "configuration"));
//!
//! let previous = producer.fetch_previous().await?;
//! let summary = producer.process(&workloads, &previous).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod entity;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod identity;
pub mod producer;

#[cfg(test)]
mod test_utils;

pub use classifier::{classify, Classification};
pub use entity::{
    ContainerInfo, Entity, NamespaceEntity, WorkloadEntity, WorkloadKind, NAMESPACE_CLASS,
    WORKLOAD_CLASS,
};
pub use error::DiscoveryError;
pub use event::{build_event, change_event, deleted_event, state_event, EventSpec};
pub use fingerprint::{fingerprint, fingerprint_payload};
pub use identity::{entity_identity, identity, Scope};
pub use producer::{EventProducer, ProcessSummary};
