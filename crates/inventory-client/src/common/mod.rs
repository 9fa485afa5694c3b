//! Common utilities for the inventory API client
//!
//! Provides the authenticated HTTP wrapper shared by all endpoints.

use crate::error::InventoryError;
use crate::models::{DiscoveryEvent, EventPage};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::debug;

/// Maximum number of response body characters kept in error messages
const ERROR_BODY_LIMIT: usize = 500;

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Make a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, InventoryError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(InventoryError::Http)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::NotFound(format!(
                "Resource not found: {} - {}",
                path, body
            )));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::Authentication(format!(
                "GET {} rejected: {} - {}",
                path, status, body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::Api(format!(
                "GET {} failed: {} - {}",
                path, status, body
            )));
        }

        // Keep the body around so decode failures show what the service sent
        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            InventoryError::Api(format!(
                "error decoding response body: {} - Response (first {} chars): {}",
                e,
                ERROR_BODY_LIMIT,
                response_text.chars().take(ERROR_BODY_LIMIT).collect::<String>()
            ))
        })
    }

    /// POST an already-serialized JSON payload, discarding the response body
    pub async fn post_json_bytes(&self, path: &str, body: Vec<u8>) -> Result<(), InventoryError> {
        let url = self.build_url(path);
        debug!("POST {} ({} bytes)", url, body.len());

        let response = self.client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(InventoryError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InventoryError::Api(format!(
                "POST {} failed: {} - {}",
                path, status, body_text
            )));
        }

        Ok(())
    }

    /// Fetch all pages of previously reported events, following `next` links
    ///
    /// Only a 404 on the first page comes back as `NotFound`. Once a page has
    /// been read, a missing follow-up page is an `Api` error: returning the
    /// partial list would look like a shorter history.
    pub async fn fetch_all_event_pages(&self, first_path: String) -> Result<Vec<DiscoveryEvent>, InventoryError> {
        let mut all_events = Vec::new();
        let mut visited = HashSet::new();
        let mut path = first_path;

        loop {
            debug!("Fetching event page: {}", path);
            let page: EventPage = match self.get(&path).await {
                Ok(page) => page,
                Err(InventoryError::NotFound(detail)) if !visited.is_empty() => {
                    return Err(InventoryError::Api(format!(
                        "event page {} disappeared after {} pages: {} - {}",
                        path,
                        visited.len(),
                        StatusCode::NOT_FOUND,
                        detail
                    )));
                }
                Err(e) => return Err(e),
            };
            all_events.extend(page.events);
            visited.insert(path);

            match page.next {
                Some(next) if !next.is_empty() => {
                    if visited.contains(&next) {
                        return Err(InventoryError::Api(format!(
                            "event pagination loops back to {}",
                            next
                        )));
                    }
                    path = next;
                }
                _ => break,
            }
        }

        Ok(all_events)
    }
}
