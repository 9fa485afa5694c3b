//! Stable entity identities.
//!
//! An identity is the SHA-256 of the canonical path
//! `workspace/<ws>/configuration/<cfg>/<class>/<discriminator>/...`,
//! hex-encoded in lower case. It depends only on where the object lives,
//! never on its payload, so the same object keeps its identity across scans.

use crate::entity::Entity;
use sha2::{Digest, Sha256};
use std::fmt;

/// Workspace + configuration pair namespacing every identity and event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub workspace_id: String,
    pub configuration_id: String,
}

impl Scope {
    /// Creates a scope.
    pub fn new(workspace_id: impl Into<String>, configuration_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            configuration_id: configuration_id.into(),
        }
    }
}

/// Renders the wire form `workspace/<id>/configuration/<id>`.
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workspace/{}/configuration/{}",
            self.workspace_id, self.configuration_id
        )
    }
}

/// Escapes the path separator inside one path component.
///
/// Without it `["a/b", "c"]` and `["a", "b/c"]` would share a path.
fn escape_component(component: &str) -> String {
    component.replace('%', "%25").replace('/', "%2F")
}

/// Computes the identity of an object from its scope, class and ordered
/// discriminators. Pure and total.
pub fn identity(scope: &Scope, class: &str, discriminators: &[&str]) -> String {
    let mut path = format!(
        "workspace/{}/configuration/{}/{}",
        escape_component(&scope.workspace_id),
        escape_component(&scope.configuration_id),
        escape_component(class),
    );
    for discriminator in discriminators {
        path.push('/');
        path.push_str(&escape_component(discriminator));
    }

    hex::encode(Sha256::digest(path.as_bytes()))
}

/// Identity of an entity within a scope.
pub fn entity_identity<E: Entity>(scope: &Scope, entity: &E) -> String {
    identity(scope, E::CLASS, &entity.discriminators())
}
