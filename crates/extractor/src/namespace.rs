//! Namespace extraction for the legacy namespace inventory.

use crate::{labels, required_name, ExtractContext, ExtractError};
use discovery::NamespaceEntity;
use k8s_openapi::api::core::v1::Namespace;

/// Flattens a Namespace.
pub fn extract_namespace(obj: &Namespace, ctx: &ExtractContext) -> Result<NamespaceEntity, ExtractError> {
    Ok(NamespaceEntity {
        name: required_name(&obj.metadata, "Namespace")?,
        cluster: ctx.cluster.clone(),
        labels: labels(&obj.metadata),
        phase: obj.status.as_ref().and_then(|s| s.phase.clone()),
        observed_at: Some(ctx.observed_at.clone()),
    })
}
