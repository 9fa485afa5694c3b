//! Inventory service wire models
//!
//! These models match the discovery event envelope accepted and returned by
//! the inventory service. Keys are part of the external contract and must
//! stay stable.

use serde::{Deserialize, Serialize};

/// Source type reported for every event produced from a cluster scan
pub const SOURCE_TYPE_KUBERNETES: &str = "kubernetes";

/// Paged list of previously reported events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub events: Vec<DiscoveryEvent>,
    /// Path or absolute URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,
}

/// One discovery event: header properties plus the state body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
    pub properties: EventProperties,
    pub body: EventBody,
}

impl DiscoveryEvent {
    /// Identity of the entity this event describes
    pub fn id(&self) -> &str {
        &self.properties.id
    }

    /// Entity payload stored in the state body
    pub fn data(&self) -> &serde_json::Value {
        &self.body.state.data
    }
}

/// Event header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProperties {
    /// Entity class, e.g. `workload` or `namespace`
    pub class: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// `workspace/<id>/configuration/<id>`
    pub scope: String,
    /// Hex digest identity of the entity
    pub id: String,
    /// Present only for `change` events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<EventAction>,
}

/// Event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Full-state report with no history (legacy snapshot mode)
    State,
    /// Incremental change against the previous report
    Change,
}

/// Change action carried by `change` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Created => write!(f, "created"),
            EventAction::Updated => write!(f, "updated"),
            EventAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// Event body wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBody {
    pub state: StateBody,
}

/// State payload: bookkeeping fields plus the entity itself in `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBody {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// `cluster/<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_instance: Option<String>,
    /// RFC 3339 emission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Out-of-band run status reported alongside event batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatus {
    pub workspace_id: String,
    pub configuration_id: String,
    pub state: ScanState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub time: String,
}

/// Scan run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Running,
    Succeeded,
    Failed,
}
