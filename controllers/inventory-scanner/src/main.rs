//! Inventory Scanner
//!
//! Polls a Kubernetes cluster and reports what it finds to the inventory
//! service as discovery events:
//! - `workloads` mode: Deployments, StatefulSets, DaemonSets and CronJobs,
//!   reported as created / updated / deleted changes since the last scan
//! - `namespaces` mode: every namespace as a full `state` snapshot
//!
//! Runs once and exits, or every `SCAN_INTERVAL_SECONDS` when set.

mod backoff;
mod config;
mod error;
mod poller;
mod scanner;
mod telemetry;

#[cfg(test)]
mod scanner_test;

use crate::config::ScannerConfig;
use crate::error::ScannerError;
use crate::scanner::Scanner;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), ScannerError> {
    let _telemetry = telemetry::init();

    // kube and reqwest both pull in rustls; pick the provider explicitly
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Inventory Scanner");

    let config = ScannerConfig::from_env()?;

    info!("Configuration:");
    info!("  Inventory URL: {}", config.inventory_url);
    info!("  Workspace: {}", config.workspace_id);
    info!("  Configuration: {}", config.configuration_id);
    info!("  Cluster: {}", config.cluster_name);
    info!("  Mode: {}", config.mode);
    info!("  Namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));
    match config.scan_interval {
        Some(interval) => info!("  Interval: {}s", interval.as_secs()),
        None => info!("  Interval: single run"),
    }

    let scanner = Scanner::connect(&config).await?;
    scanner.run(config.scan_interval).await?;

    info!("Inventory Scanner stopped");
    Ok(())
}
