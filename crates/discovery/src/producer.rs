//! Event production.
//!
//! The `EventProducer` composes identity, classification and event building
//! for one scan and performs at most one outbound batch call. It never
//! retries: transport errors are returned to the caller as they are.

use crate::classifier::classify;
use crate::entity::Entity;
use crate::error::DiscoveryError;
use crate::event::{deleted_event, now_rfc3339, state_event};
use crate::identity::{entity_identity, Scope};
use inventory_client::{DiscoveryEvent, InventoryClientTrait, ScanState, ScanStatus};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counts from one `process` or `snapshot` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// Snapshot events (legacy mode only)
    pub reported: usize,
    /// Whether a batch was posted
    pub sent: bool,
}

impl ProcessSummary {
    /// Number of events in the batch
    pub fn total_events(&self) -> usize {
        self.created + self.updated + self.deleted + self.reported
    }
}

impl fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reported > 0 {
            return write!(f, "{} reported", self.reported);
        }
        write!(
            f,
            "{} created, {} updated, {} deleted, {} unchanged",
            self.created, self.updated, self.deleted, self.unchanged
        )
    }
}

/// Keys current entities by identity. On a duplicate identity the last
/// entity wins.
pub fn index_current<E: Entity>(scope: &Scope, current: &[E]) -> BTreeMap<String, E> {
    let mut indexed = BTreeMap::new();
    for entity in current {
        let id = entity_identity(scope, entity);
        if indexed.insert(id.clone(), entity.clone()).is_some() {
            warn!("Duplicate {} identity {} for {}, keeping the last one", E::CLASS, id, entity.display_name());
        }
    }
    indexed
}

/// Keys previous events of one class by their stored identity.
///
/// Events of other classes are skipped: they belong to another inventory
/// and must not be reported as deleted by this one.
pub fn index_previous(class: &str, previous: &[DiscoveryEvent]) -> BTreeMap<String, DiscoveryEvent> {
    let mut indexed = BTreeMap::new();
    for event in previous.iter().filter(|e| e.properties.class == class) {
        if indexed.insert(event.id().to_string(), event.clone()).is_some() {
            warn!("Duplicate previous {} event {}, keeping the last one", class, event.id());
        }
    }
    indexed
}

/// Produces and sends discovery events for one scope.
pub struct EventProducer {
    client: Arc<dyn InventoryClientTrait>,
    scope: Scope,
}

impl fmt::Debug for EventProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventProducer")
            .field("inventory", &self.client.base_url())
            .field("scope", &self.scope)
            .finish()
    }
}

impl EventProducer {
    /// Creates a producer posting to `client` under `scope`.
    pub fn new(client: Arc<dyn InventoryClientTrait>, scope: Scope) -> Self {
        Self { client, scope }
    }

    /// Scope every event is produced under
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Fetches the previous baseline for this scope's configuration.
    pub async fn fetch_previous(&self) -> Result<Vec<DiscoveryEvent>, DiscoveryError> {
        Ok(self.client.fetch_previous_events(&self.scope.configuration_id).await?)
    }

    /// Diffs the current entities against the previous events and posts the
    /// created, updated and deleted events as one batch.
    ///
    /// `previous` is only read; the working map is a copy. Nothing is sent
    /// when there is nothing to report.
    #[instrument(skip_all, fields(configuration = %self.scope.configuration_id, class = E::CLASS))]
    pub async fn process<E: Entity>(
        &self,
        current: &[E],
        previous: &[DiscoveryEvent],
    ) -> Result<ProcessSummary, DiscoveryError> {
        let current = index_current(&self.scope, current);
        let previous = index_previous(E::CLASS, previous);
        debug!("Classifying {} current against {} previous", current.len(), previous.len());

        let classification = classify(&current, previous, &self.scope)?;

        let mut summary = ProcessSummary {
            created: classification.created.len(),
            updated: classification.updated.len(),
            deleted: classification.remaining_previous.len(),
            unchanged: classification.unchanged.len(),
            ..Default::default()
        };

        let mut batch = Vec::with_capacity(summary.total_events());
        batch.extend(classification.created);
        batch.extend(classification.updated);
        batch.extend(
            classification
                .remaining_previous
                .into_values()
                .map(|prior| deleted_event(prior, &self.scope)),
        );

        summary.sent = self.send_batch(&batch).await?;
        info!("Processed {} inventory: {}", E::CLASS, summary);
        Ok(summary)
    }

    /// Legacy snapshot mode: reports every current entity as a `state`
    /// event with no diffing.
    #[instrument(skip_all, fields(configuration = %self.scope.configuration_id, class = E::CLASS))]
    pub async fn snapshot<E: Entity>(&self, current: &[E]) -> Result<ProcessSummary, DiscoveryError> {
        let current = index_current(&self.scope, current);
        let batch = current
            .iter()
            .map(|(id, entity)| state_event(id, entity, &self.scope))
            .collect::<Result<Vec<_>, _>>()?;

        let summary = ProcessSummary {
            reported: batch.len(),
            sent: self.send_batch(&batch).await?,
            ..Default::default()
        };
        info!("Reported {} snapshot: {} entities", E::CLASS, summary.reported);
        Ok(summary)
    }

    /// Forwards a run status update over the status side channel.
    pub async fn report_status(&self, state: ScanState, message: Option<String>) -> Result<(), DiscoveryError> {
        let status = ScanStatus {
            workspace_id: self.scope.workspace_id.clone(),
            configuration_id: self.scope.configuration_id.clone(),
            state,
            message,
            time: now_rfc3339(),
        };
        let payload = serde_json::to_vec(&status)?;
        self.client.post_status(payload).await?;
        Ok(())
    }

    /// Serializes and posts a batch. Returns whether anything was sent.
    async fn send_batch(&self, batch: &[DiscoveryEvent]) -> Result<bool, DiscoveryError> {
        if batch.is_empty() {
            debug!("Nothing to report, skipping inventory call");
            return Ok(false);
        }

        let payload = serde_json::to_vec(batch)?;
        info!("Posting {} discovery events ({} bytes)", batch.len(), payload.len());
        self.client.post_event_batch(payload).await?;
        Ok(true)
    }
}
