//! Extraction errors.

use thiserror::Error;

/// Errors raised while flattening a cluster object into an entity.
///
/// Any of these aborts the scan before classification.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A field the entity identity depends on is missing
    #[error("{kind} is missing {field}")]
    MissingField {
        /// Kubernetes kind of the object
        kind: &'static str,
        /// Dotted path of the missing field
        field: &'static str,
    },

    /// A field is present but unusable, e.g. an empty name
    #[error("{kind} {name} has invalid {field}: {reason}")]
    InvalidField {
        /// Kubernetes kind of the object
        kind: &'static str,
        /// Object name, if known
        name: String,
        /// Dotted path of the field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
