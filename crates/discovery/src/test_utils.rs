//! Test utilities for unit testing the discovery engine
//!
//! This module provides helpers for creating test entities and previously
//! reported events.

use crate::entity::{ContainerInfo, Entity, NamespaceEntity, WorkloadEntity, WorkloadKind};
use crate::event::change_event;
use crate::identity::{entity_identity, Scope};
use inventory_client::{DiscoveryEvent, EventAction};
use std::collections::BTreeMap;

/// Scope used by every test
pub fn test_scope() -> Scope {
    Scope::new("test-workspace", "test-configuration")
}

/// Helper to create a single-container test Deployment entity
pub fn workload(name: &str, namespace: &str, image: &str) -> WorkloadEntity {
    WorkloadEntity {
        name: name.to_string(),
        kind: WorkloadKind::Deployment,
        namespace: namespace.to_string(),
        cluster: "test-cluster".to_string(),
        containers: vec![ContainerInfo {
            name: "main".to_string(),
            image: image.to_string(),
            requests: BTreeMap::from([("cpu".to_string(), "100m".to_string())]),
            limits: BTreeMap::from([("memory".to_string(), "256Mi".to_string())]),
        }],
        replicas: Some(2),
        ready_replicas: None,
        service_name: None,
        schedule: None,
        labels: BTreeMap::from([("app".to_string(), name.to_string())]),
        update_strategy: Some("RollingUpdate".to_string()),
        observed_at: None,
    }
}

/// Helper to create an active test namespace entity
pub fn namespace(name: &str) -> NamespaceEntity {
    NamespaceEntity {
        name: name.to_string(),
        cluster: "test-cluster".to_string(),
        labels: BTreeMap::new(),
        phase: Some("Active".to_string()),
        observed_at: None,
    }
}

/// Helper to create the event a previous run would have stored for an entity
pub fn previous_event<E: Entity>(id: &str, entity: &E, scope: &Scope) -> DiscoveryEvent {
    change_event(EventAction::Created, id, entity, scope).expect("test entity serializes")
}

/// Helper to create the stored event for an entity under its real identity
pub fn stored<E: Entity>(entity: &E, scope: &Scope) -> DiscoveryEvent {
    previous_event(&entity_identity(scope, entity), entity, scope)
}
