//! Scan orchestration.
//!
//! A scan polls the cluster, hands the entities to the discovery engine and
//! reports the run's status to the inventory service. In periodic mode the
//! scanner repeats this until it is asked to stop, backing off after
//! failures.

use crate::backoff::FibonacciBackoff;
use crate::config::{InventoryMode, ScannerConfig};
use crate::error::ScannerError;
use crate::poller::{ClusterPoller, ClusterSource};
use discovery::event::now_rfc3339;
use discovery::{EventProducer, ProcessSummary, Scope};
use extractor::ExtractContext;
use inventory_client::{InventoryClient, InventoryClientTrait, ScanState};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Backoff after a failed scan, in seconds
const BACKOFF_MIN_SECONDS: u64 = 30;
const BACKOFF_MAX_SECONDS: u64 = 600;

/// Runs scans for one cluster and one inventory configuration.
pub struct Scanner {
    source: Arc<dyn ClusterSource>,
    producer: EventProducer,
    cluster: String,
    mode: InventoryMode,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("producer", &self.producer)
            .field("cluster", &self.cluster)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Scanner {
    /// Connects to the cluster and the inventory service.
    ///
    /// The inventory token is validated up front so a bad deployment fails
    /// fast instead of on the first batch.
    pub async fn connect(config: &ScannerConfig) -> Result<Self, ScannerError> {
        info!("Initializing inventory scanner");

        let kube_client = Client::try_default().await?;

        let inventory = InventoryClient::new(config.inventory_url.clone(), config.inventory_token.clone())?;

        info!("Validating inventory token and connectivity...");
        inventory.validate_token().await.map_err(|e| {
            error!("Failed to validate inventory token: {}", e);
            error!("Please ensure:");
            error!("  1. INVENTORY_TOKEN environment variable is set correctly");
            error!("  2. The token is valid for workspace {}", config.workspace_id);
            error!("  3. The inventory service is reachable at {}", config.inventory_url);
            ScannerError::Inventory(e)
        })?;
        info!("Inventory token validated and connectivity established");

        let source = ClusterPoller::new(kube_client, config.watch_namespace.clone());
        Ok(Self::new(
            Arc::new(source),
            Arc::new(inventory),
            Scope::new(config.workspace_id.clone(), config.configuration_id.clone()),
            config.cluster_name.clone(),
            config.mode,
        ))
    }

    /// Assembles a scanner from its parts.
    pub fn new(
        source: Arc<dyn ClusterSource>,
        inventory: Arc<dyn InventoryClientTrait>,
        scope: Scope,
        cluster: String,
        mode: InventoryMode,
    ) -> Self {
        Self {
            source,
            producer: EventProducer::new(inventory, scope),
            cluster,
            mode,
        }
    }

    /// Runs one scan and reports its outcome over the status channel.
    ///
    /// Status updates are best effort: a failed status post is logged and
    /// never changes the scan's result.
    #[instrument(skip_all, fields(cluster = %self.cluster, mode = %self.mode))]
    pub async fn run_once(&self) -> Result<ProcessSummary, ScannerError> {
        self.post_status(ScanState::Running, None).await;

        let result = self.scan().await;

        match &result {
            Ok(summary) => {
                info!("Scan completed: {}", summary);
                self.post_status(ScanState::Succeeded, Some(summary.to_string())).await;
            }
            Err(e) => {
                error!("Scan failed: {}", e);
                self.post_status(ScanState::Failed, Some(e.to_string())).await;
            }
        }

        result
    }

    async fn scan(&self) -> Result<ProcessSummary, ScannerError> {
        let ctx = ExtractContext::new(self.cluster.clone(), now_rfc3339());

        match self.mode {
            InventoryMode::Workloads => {
                let previous = self.producer.fetch_previous().await?;
                let workloads = self.source.workloads(&ctx).await?;
                Ok(self.producer.process(&workloads, &previous).await?)
            }
            InventoryMode::Namespaces => {
                let namespaces = self.source.namespaces(&ctx).await?;
                Ok(self.producer.snapshot(&namespaces).await?)
            }
        }
    }

    async fn post_status(&self, state: ScanState, message: Option<String>) {
        if let Err(e) = self.producer.report_status(state, message).await {
            warn!("Failed to report {:?} status: {}", state, e);
        }
    }

    /// Runs a single scan, or scans every `interval` until Ctrl-C.
    ///
    /// In periodic mode a failed scan is retried after a Fibonacci backoff
    /// instead of the regular interval.
    pub async fn run(&self, interval: Option<Duration>) -> Result<(), ScannerError> {
        let Some(interval) = interval else {
            self.run_once().await?;
            return Ok(());
        };

        info!("Scanning every {}s", interval.as_secs());
        let mut backoff = FibonacciBackoff::new(BACKOFF_MIN_SECONDS, BACKOFF_MAX_SECONDS);

        loop {
            let delay = match self.run_once().await {
                Ok(_) => {
                    backoff.reset();
                    interval
                }
                Err(e) => {
                    let delay = backoff.next_backoff();
                    warn!("Retrying scan in {}s after: {}", delay.as_secs(), e);
                    delay
                }
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            info!("Shutdown requested, stopping scanner");
                            return Ok(());
                        }
                        Err(e) => {
                            warn!("Failed to listen for shutdown signal: {}", e);
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }
    }
}
