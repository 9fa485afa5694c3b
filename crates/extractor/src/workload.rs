//! Workload extraction.
//!
//! Every workload kind reduces to the same record: identity-bearing
//! metadata, the pod template's containers, and a few kind-specific fields.

use crate::{labels, required_name, required_namespace, ExtractContext, ExtractError};
use discovery::{ContainerInfo, WorkloadEntity, WorkloadKind};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{Container, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::debug;

/// Normalizes string fields that are optional in some API versions and
/// required in others.
trait OptionalString {
    fn into_optional(self) -> Option<String>;
}

impl OptionalString for String {
    fn into_optional(self) -> Option<String> {
        Some(self).filter(|s| !s.is_empty())
    }
}

impl OptionalString for Option<String> {
    fn into_optional(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

fn quantities(map: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, String> {
    map.map(|m| m.iter().map(|(k, q)| (k.clone(), q.0.clone())).collect())
        .unwrap_or_default()
}

fn container_info(container: &Container) -> ContainerInfo {
    let resources = container.resources.as_ref();
    ContainerInfo {
        name: container.name.clone(),
        image: container.image.clone().unwrap_or_default(),
        requests: quantities(resources.and_then(|r| r.requests.as_ref())),
        limits: quantities(resources.and_then(|r| r.limits.as_ref())),
    }
}

/// Init containers are not reported; they do not run for the workload's lifetime.
fn containers(template: Option<&PodTemplateSpec>) -> Vec<ContainerInfo> {
    template
        .and_then(|t| t.spec.as_ref())
        .map(|spec| spec.containers.iter().map(container_info).collect())
        .unwrap_or_default()
}

/// Common skeleton shared by all kinds; callers fill in kind-specific fields.
fn base_entity(
    meta: &ObjectMeta,
    kind: WorkloadKind,
    ctx: &ExtractContext,
) -> Result<WorkloadEntity, ExtractError> {
    let name = required_name(meta, kind.as_str())?;
    let namespace = required_namespace(meta, kind.as_str())?;
    debug!("Extracting {} {}/{}", kind, namespace, name);

    Ok(WorkloadEntity {
        name,
        kind,
        namespace,
        cluster: ctx.cluster.clone(),
        containers: Vec::new(),
        replicas: None,
        ready_replicas: None,
        service_name: None,
        schedule: None,
        labels: labels(meta),
        update_strategy: None,
        observed_at: Some(ctx.observed_at.clone()),
    })
}

/// Flattens a Deployment.
pub fn extract_deployment(obj: &Deployment, ctx: &ExtractContext) -> Result<WorkloadEntity, ExtractError> {
    let mut entity = base_entity(&obj.metadata, WorkloadKind::Deployment, ctx)?;
    if let Some(spec) = &obj.spec {
        entity.containers = containers(Some(&spec.template));
        entity.replicas = Some(spec.replicas.unwrap_or(1));
        entity.update_strategy = spec.strategy.as_ref().and_then(|s| s.type_.clone());
    }
    entity.ready_replicas = obj.status.as_ref().and_then(|s| s.ready_replicas);
    Ok(entity)
}

/// Flattens a StatefulSet, including its governing service name.
pub fn extract_stateful_set(obj: &StatefulSet, ctx: &ExtractContext) -> Result<WorkloadEntity, ExtractError> {
    let mut entity = base_entity(&obj.metadata, WorkloadKind::StatefulSet, ctx)?;
    if let Some(spec) = &obj.spec {
        entity.containers = containers(Some(&spec.template));
        entity.replicas = Some(spec.replicas.unwrap_or(1));
        entity.service_name = spec.service_name.clone().into_optional();
        entity.update_strategy = spec.update_strategy.as_ref().and_then(|s| s.type_.clone());
    }
    entity.ready_replicas = obj.status.as_ref().and_then(|s| s.ready_replicas);
    Ok(entity)
}

/// Flattens a DaemonSet. Daemon sets have no replica count of their own.
pub fn extract_daemon_set(obj: &DaemonSet, ctx: &ExtractContext) -> Result<WorkloadEntity, ExtractError> {
    let mut entity = base_entity(&obj.metadata, WorkloadKind::DaemonSet, ctx)?;
    if let Some(spec) = &obj.spec {
        entity.containers = containers(Some(&spec.template));
        entity.update_strategy = spec.update_strategy.as_ref().and_then(|s| s.type_.clone());
    }
    entity.ready_replicas = obj.status.as_ref().map(|s| s.number_ready);
    Ok(entity)
}

/// Flattens a CronJob using its job template's pod template.
pub fn extract_cron_job(obj: &CronJob, ctx: &ExtractContext) -> Result<WorkloadEntity, ExtractError> {
    let mut entity = base_entity(&obj.metadata, WorkloadKind::CronJob, ctx)?;
    if let Some(spec) = &obj.spec {
        let template = spec.job_template.spec.as_ref().map(|job| &job.template);
        entity.containers = containers(template);
        entity.schedule = spec.schedule.clone().into_optional();
        entity.update_strategy = spec.concurrency_policy.clone();
    }
    Ok(entity)
}
