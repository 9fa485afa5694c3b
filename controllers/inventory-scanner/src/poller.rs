//! Cluster polling.
//!
//! Lists workload and namespace objects from the Kubernetes API and flattens
//! them into entities. Lists are paged so large clusters do not produce one
//! giant response.

use crate::error::ScannerError;
use async_trait::async_trait;
use discovery::{NamespaceEntity, WorkloadEntity};
use extractor::{
    extract_cron_job, extract_daemon_set, extract_deployment, extract_namespace,
    extract_stateful_set, ExtractContext,
};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, info};

/// Page size for list calls
const PAGE_SIZE: u32 = 500;

/// Where a scan gets its current entities from.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// All workloads visible to the scanner
    async fn workloads(&self, ctx: &ExtractContext) -> Result<Vec<WorkloadEntity>, ScannerError>;

    /// All namespaces in the cluster
    async fn namespaces(&self, ctx: &ExtractContext) -> Result<Vec<NamespaceEntity>, ScannerError>;
}

/// Polls the Kubernetes API.
#[derive(Clone)]
pub struct ClusterPoller {
    client: Client,
    namespace: Option<String>,
}

impl Debug for ClusterPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterPoller")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl ClusterPoller {
    /// Creates a poller. `namespace` restricts workload listing.
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    fn workload_api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

/// Lists every object of a kind, following continue tokens.
async fn list_all<K>(api: &Api<K>) -> Result<Vec<K>, ScannerError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let mut items = Vec::new();
    let mut params = ListParams::default().limit(PAGE_SIZE);

    loop {
        let page = api.list(&params).await?;
        items.extend(page.items);

        match page.metadata.continue_.filter(|token| !token.is_empty()) {
            Some(token) => params = params.continue_token(&token),
            None => break,
        }
    }

    Ok(items)
}

fn extract_all<K, T, F>(objects: &[K], ctx: &ExtractContext, extract: F) -> Result<Vec<T>, ScannerError>
where
    F: Fn(&K, &ExtractContext) -> Result<T, extractor::ExtractError>,
{
    objects
        .iter()
        .map(|obj| extract(obj, ctx).map_err(ScannerError::from))
        .collect()
}

#[async_trait]
impl ClusterSource for ClusterPoller {
    async fn workloads(&self, ctx: &ExtractContext) -> Result<Vec<WorkloadEntity>, ScannerError> {
        let deployments: Api<Deployment> = self.workload_api();
        let stateful_sets: Api<StatefulSet> = self.workload_api();
        let daemon_sets: Api<DaemonSet> = self.workload_api();
        let cron_jobs: Api<CronJob> = self.workload_api();

        let (deployments, stateful_sets, daemon_sets, cron_jobs) = tokio::try_join!(
            list_all(&deployments),
            list_all(&stateful_sets),
            list_all(&daemon_sets),
            list_all(&cron_jobs),
        )?;
        debug!(
            "Listed {} deployments, {} statefulsets, {} daemonsets, {} cronjobs",
            deployments.len(),
            stateful_sets.len(),
            daemon_sets.len(),
            cron_jobs.len()
        );

        let mut workloads = extract_all(&deployments, ctx, extract_deployment)?;
        workloads.extend(extract_all(&stateful_sets, ctx, extract_stateful_set)?);
        workloads.extend(extract_all(&daemon_sets, ctx, extract_daemon_set)?);
        workloads.extend(extract_all(&cron_jobs, ctx, extract_cron_job)?);

        info!(
            "Polled {} workloads in {}",
            workloads.len(),
            self.namespace.as_deref().unwrap_or("all namespaces")
        );
        Ok(workloads)
    }

    async fn namespaces(&self, ctx: &ExtractContext) -> Result<Vec<NamespaceEntity>, ScannerError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = list_all(&api).await?;
        let entities = extract_all(&namespaces, ctx, extract_namespace)?;
        info!("Polled {} namespaces", entities.len());
        Ok(entities)
    }
}
