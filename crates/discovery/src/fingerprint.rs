//! Content fingerprints.
//!
//! A fingerprint is the SHA-256 of an entity's canonical JSON: object keys
//! sorted at every depth, no whitespace, `null` members dropped, and the
//! kind's volatile top-level fields removed. The same payload always yields
//! the same fingerprint whatever map ordering produced it, and a stored
//! payload read back from the inventory service hashes the same as the
//! entity it was built from.

use crate::entity::Entity;
use crate::error::DiscoveryError;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Fingerprint of a freshly extracted entity.
pub fn fingerprint<E: Entity>(entity: &E) -> Result<String, DiscoveryError> {
    let payload = serde_json::to_value(entity)?;
    Ok(fingerprint_payload(&payload, E::VOLATILE_FIELDS))
}

/// Fingerprint of an already-serialized payload, e.g. the `data` of a
/// previously reported event.
pub fn fingerprint_payload(payload: &Value, volatile_fields: &[&str]) -> String {
    let mut canonical = Vec::new();
    match payload {
        Value::Object(map) => write_object(&mut canonical, map, volatile_fields),
        other => write_value(&mut canonical, other),
    }
    hex::encode(Sha256::digest(&canonical))
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Object(map) => write_object(out, map, &[]),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item);
            }
            out.push(b']');
        }
        // Scalars render as compact JSON
        scalar => out.extend_from_slice(scalar.to_string().as_bytes()),
    }
}

fn write_object(out: &mut Vec<u8>, map: &Map<String, Value>, skip: &[&str]) {
    let mut entries: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(key, value)| !value.is_null() && !skip.contains(&key.as_str()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(Value::from(key.as_str()).to_string().as_bytes());
        out.push(b':');
        write_value(out, value);
    }
    out.push(b'}');
}
