//! Scanner configuration.
//!
//! Everything is read from environment variables at startup. Parsing goes
//! through a lookup function so tests do not touch the process environment.

use crate::error::ScannerError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default inventory service URL inside the cluster
pub const DEFAULT_INVENTORY_URL: &str = "http://inventory.inventory:80";

/// What a scan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryMode {
    /// Workloads with change tracking against the previous report
    Workloads,
    /// Legacy mode: namespaces as full `state` snapshots
    Namespaces,
}

impl FromStr for InventoryMode {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workloads" => Ok(InventoryMode::Workloads),
            "namespaces" => Ok(InventoryMode::Namespaces),
            other => Err(ScannerError::InvalidConfig(format!(
                "INVENTORY_MODE must be 'workloads' or 'namespaces', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InventoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryMode::Workloads => write!(f, "workloads"),
            InventoryMode::Namespaces => write!(f, "namespaces"),
        }
    }
}

/// Scanner configuration
#[derive(Clone)]
pub struct ScannerConfig {
    pub inventory_url: String,
    pub inventory_token: String,
    pub workspace_id: String,
    pub configuration_id: String,
    pub cluster_name: String,
    pub mode: InventoryMode,
    /// `None` runs a single scan and exits
    pub scan_interval: Option<Duration>,
    /// Restricts workload listing to one namespace
    pub watch_namespace: Option<String>,
}

// Hand-written so the token never reaches the logs
impl fmt::Debug for ScannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerConfig")
            .field("inventory_url", &self.inventory_url)
            .field("inventory_token", &"<redacted>")
            .field("workspace_id", &self.workspace_id)
            .field("configuration_id", &self.configuration_id)
            .field("cluster_name", &self.cluster_name)
            .field("mode", &self.mode)
            .field("scan_interval", &self.scan_interval)
            .field("watch_namespace", &self.watch_namespace)
            .finish()
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ScannerError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ScannerError::InvalidConfig(format!("{} environment variable is required", key)))
}

impl ScannerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ScannerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let inventory_url = lookup("INVENTORY_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INVENTORY_URL.to_string());

        let mode = match lookup("INVENTORY_MODE") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => InventoryMode::Workloads,
        };

        let scan_interval = match lookup("SCAN_INTERVAL_SECONDS") {
            Some(raw) if !raw.trim().is_empty() => {
                let seconds: u64 = raw.trim().parse().map_err(|_| {
                    ScannerError::InvalidConfig(format!(
                        "SCAN_INTERVAL_SECONDS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if seconds == 0 {
                    return Err(ScannerError::InvalidConfig(
                        "SCAN_INTERVAL_SECONDS must be greater than zero".to_string(),
                    ));
                }
                Some(Duration::from_secs(seconds))
            }
            _ => None,
        };

        Ok(Self {
            inventory_url,
            inventory_token: required(&lookup, "INVENTORY_TOKEN")?,
            workspace_id: required(&lookup, "WORKSPACE_ID")?,
            configuration_id: required(&lookup, "CONFIGURATION_ID")?,
            cluster_name: required(&lookup, "CLUSTER_NAME")?,
            mode,
            scan_interval,
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|v| !v.trim().is_empty()),
        })
    }
}
