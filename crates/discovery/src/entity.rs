//! Normalized entity records.
//!
//! An entity is the plain, kind-specific snapshot of one cluster object that
//! the engine reports. Entities are recreated on every scan and have no
//! identity until one is derived from their discriminators.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Entity class reported for workloads
pub const WORKLOAD_CLASS: &str = "workload";

/// Entity class reported for namespaces
pub const NAMESPACE_CLASS: &str = "namespace";

/// Per-kind strategy the engine is generic over.
///
/// The classifier, event builder and producer never look inside an entity;
/// everything they need comes through this trait.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Class written into `properties.class`
    const CLASS: &'static str;

    /// Top-level payload fields that change without semantic meaning.
    ///
    /// They are still reported in `data` but never take part in the
    /// fingerprint, so they cannot produce updated events on their own.
    const VOLATILE_FIELDS: &'static [&'static str];

    /// Ordered identity discriminators below the entity class.
    ///
    /// The order is part of the identity contract: changing it changes every
    /// identity of this kind.
    fn discriminators(&self) -> Vec<&str>;

    /// Name written into `body.state.name`
    fn display_name(&self) -> &str;

    /// Cluster the entity was observed in
    fn cluster(&self) -> &str;
}

/// Workload controller kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    CronJob,
}

impl WorkloadKind {
    /// Kubernetes kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::CronJob => "CronJob",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container image and resources of a workload's pod template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    /// Resource name (`cpu`, `memory`, ...) to quantity
    #[serde(default)]
    pub requests: BTreeMap<String, String>,
    #[serde(default)]
    pub limits: BTreeMap<String, String>,
}

/// Workload snapshot: a deployment, stateful set, daemon set or cron job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEntity {
    pub name: String,
    pub kind: WorkloadKind,
    pub namespace: String,
    pub cluster: String,
    #[serde(default)]
    pub containers: Vec<ContainerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Status counter, volatile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,
    /// Governing service of a stateful set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Cron schedule of a cron job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<String>,
    /// RFC 3339 time the scan observed the object, volatile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,
}

impl Entity for WorkloadEntity {
    const CLASS: &'static str = WORKLOAD_CLASS;
    const VOLATILE_FIELDS: &'static [&'static str] = &["observedAt", "readyReplicas"];

    fn discriminators(&self) -> Vec<&str> {
        vec![
            self.cluster.as_str(),
            self.kind.as_str(),
            self.name.as_str(),
            self.namespace.as_str(),
        ]
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn cluster(&self) -> &str {
        &self.cluster
    }
}

/// Namespace snapshot, reported by the legacy namespace inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceEntity {
    pub name: String,
    pub cluster: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// `Active` or `Terminating`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,
}

impl Entity for NamespaceEntity {
    const CLASS: &'static str = NAMESPACE_CLASS;
    const VOLATILE_FIELDS: &'static [&'static str] = &["observedAt"];

    fn discriminators(&self) -> Vec<&str> {
        vec![self.cluster.as_str(), self.name.as_str()]
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn cluster(&self) -> &str {
        &self.cluster
    }
}
