//! Inventory service API client
//!
//! Implements the three calls the discovery engine needs:
//! `GET /api/v1/configurations/{id}/events`, `POST /api/v1/events` and
//! `POST /api/v1/status`.

use crate::common::HttpClient;
use crate::error::InventoryError;
use crate::models::DiscoveryEvent;
use crate::inventory_trait::InventoryClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const EVENTS_PATH: &str = "/api/v1/events";
const STATUS_PATH: &str = "/api/v1/status";

/// Inventory service API client
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: HttpClient,
}

impl InventoryClient {
    /// Create a new inventory client
    ///
    /// # Arguments
    /// * `base_url` - Inventory service base URL (e.g., "http://inventory:80")
    /// * `token` - API token for bearer authentication
    pub fn new(base_url: String, token: String) -> Result<Self, InventoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(InventoryError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    fn previous_events_path(configuration_id: &str) -> String {
        format!(
            "/api/v1/configurations/{}/events",
            urlencoding::encode(configuration_id)
        )
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for InventoryClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a lightweight authenticated request.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and the service is reachable
    /// * `Err(InventoryError)` - Token is invalid or the service is unreachable
    async fn validate_token(&self) -> Result<(), InventoryError> {
        debug!("Validating inventory token and connectivity");
        let _: serde_json::Value = self.http.get(STATUS_PATH).await?;
        debug!("Token validated successfully");
        Ok(())
    }

    async fn fetch_previous_events(&self, configuration_id: &str) -> Result<Vec<DiscoveryEvent>, InventoryError> {
        if configuration_id.is_empty() {
            return Err(InventoryError::InvalidRequest(
                "configuration id must not be empty".to_string(),
            ));
        }

        let path = Self::previous_events_path(configuration_id);
        match self.http.fetch_all_event_pages(path).await {
            Ok(events) => {
                info!(
                    "Fetched {} previously reported events for configuration {}",
                    events.len(),
                    configuration_id
                );
                Ok(events)
            }
            // 404 on the first page only: no prior record is "no history"
            Err(InventoryError::NotFound(_)) => {
                info!("No previous events recorded for configuration {}", configuration_id);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn post_event_batch(&self, batch: Vec<u8>) -> Result<(), InventoryError> {
        self.http.post_json_bytes(EVENTS_PATH, batch).await
    }

    async fn post_status(&self, status: Vec<u8>) -> Result<(), InventoryError> {
        self.http.post_json_bytes(STATUS_PATH, status).await
    }
}
