//! Change classification.
//!
//! Partitions `current ∪ previous` into created, updated, unchanged and
//! deleted. Classification is per identity and order-independent; the maps
//! are ordered by identity so a given input always yields the same output.

use crate::entity::Entity;
use crate::error::DiscoveryError;
use crate::event::change_event;
use crate::fingerprint::{fingerprint, fingerprint_payload};
use crate::identity::Scope;
use inventory_client::{DiscoveryEvent, EventAction};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of classifying one scan against the previous report.
#[derive(Debug, Default)]
pub struct Classification {
    /// Events for identities not previously reported
    pub created: Vec<DiscoveryEvent>,
    /// Events for identities whose fingerprint changed, carrying the new data
    pub updated: Vec<DiscoveryEvent>,
    /// Identities present in both with equal fingerprints
    pub unchanged: Vec<String>,
    /// Previously reported identities absent from the scan: the deletions
    pub remaining_previous: BTreeMap<String, DiscoveryEvent>,
}

/// Classifies the current entities against the previous events.
///
/// `previous` is a disposable working copy: every reconciled identity is
/// drained from it and whatever is left is returned as `remaining_previous`.
/// Fails only if a current entity cannot be serialized.
pub fn classify<E: Entity>(
    current: &BTreeMap<String, E>,
    mut previous: BTreeMap<String, DiscoveryEvent>,
    scope: &Scope,
) -> Result<Classification, DiscoveryError> {
    let mut created = Vec::new();
    let mut updated = Vec::new();
    let mut unchanged = Vec::new();

    for (id, entity) in current {
        let Some(prior) = previous.remove(id) else {
            debug!("{} {} is new", E::CLASS, entity.display_name());
            created.push(change_event(EventAction::Created, id, entity, scope)?);
            continue;
        };

        let before = fingerprint_payload(prior.data(), E::VOLATILE_FIELDS);
        let after = fingerprint(entity)?;
        if before == after {
            unchanged.push(id.clone());
        } else {
            debug!("{} {} changed ({} -> {})", E::CLASS, entity.display_name(), before, after);
            updated.push(change_event(EventAction::Updated, id, entity, scope)?);
        }
    }

    Ok(Classification {
        created,
        updated,
        unchanged,
        remaining_previous: previous,
    })
}
