//! Kubernetes Entity Extractor
//!
//! Flattens typed `k8s-openapi` objects into the plain entity records the
//! discovery engine reports:
//! - Deployments, StatefulSets, DaemonSets and CronJobs become `WorkloadEntity`
//! - Namespaces become `NamespaceEntity`
//!
//! Extraction is pure: the caller supplies the cluster name and the
//! observation time through an [`ExtractContext`].

pub mod error;
pub mod namespace;
pub mod workload;


pub use error::ExtractError;
pub use namespace::extract_namespace;
pub use workload::{
    extract_cron_job, extract_daemon_set, extract_deployment, extract_stateful_set,
};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Values shared by every entity extracted in one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractContext {
    /// Cluster name written into every entity
    pub cluster: String,
    /// RFC 3339 scan time, reported as the volatile `observedAt`
    pub observed_at: String,
}

impl ExtractContext {
    /// Creates a context.
    pub fn new(cluster: impl Into<String>, observed_at: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            observed_at: observed_at.into(),
        }
    }
}

/// Returns `metadata.name`, which every identity depends on.
pub(crate) fn required_name(meta: &ObjectMeta, kind: &'static str) -> Result<String, ExtractError> {
    match meta.name.as_deref() {
        None => Err(ExtractError::MissingField { kind, field: "metadata.name" }),
        Some("") => Err(ExtractError::InvalidField {
            kind,
            name: String::new(),
            field: "metadata.name",
            reason: "name is empty".to_string(),
        }),
        Some(name) => Ok(name.to_string()),
    }
}

/// Returns `metadata.namespace` for namespaced objects.
pub(crate) fn required_namespace(meta: &ObjectMeta, kind: &'static str) -> Result<String, ExtractError> {
    meta.namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .ok_or(ExtractError::MissingField { kind, field: "metadata.namespace" })
}

/// Labels as a sorted map, empty when unset.
pub(crate) fn labels(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}
