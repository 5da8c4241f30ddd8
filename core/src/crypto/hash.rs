//! # Integrity Hashing
//!
//! Content hashes for credential payloads. SHA-256 over a canonical JSON
//! rendering, printed as lowercase hex.
//!
//! These hashes are for audit trails and deduplication. They are NOT
//! authentication and NOT capabilities: anyone holding the payload can
//! recompute the hash, so never gate access on knowing one.
//!
//! ## Canonical form
//!
//! Object keys are sorted (recursively) and the output is compact JSON with
//! no insignificant whitespace. The cipher serializes through the same
//! function, so the hash of a payload always describes exactly the bytes
//! that were encrypted.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::HASH_OUTPUT_LENGTH;

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Render a payload in canonical byte form.
///
/// Two payloads that are equal as JSON values produce identical bytes,
/// regardless of the key order they were built with.
pub fn canonical_bytes(payload: &Value) -> Vec<u8> {
    sort_keys(payload).to_string().into_bytes()
}

/// Hash a payload: `hex(SHA-256(canonical_bytes(payload)))`.
///
/// # Example
///
/// ```
/// use credvault::crypto::hash_payload;
/// use serde_json::json;
///
/// let a = hash_payload(&json!({ "name": "Ada", "degree": "BSc" }));
/// let b = hash_payload(&json!({ "degree": "BSc", "name": "Ada" }));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn hash_payload(payload: &Value) -> String {
    hex::encode(sha256(&canonical_bytes(payload)))
}

/// Rebuild a value with every object's keys in lexicographic order.
///
/// `serde_json::Map` is a `BTreeMap` unless some crate in the graph turns on
/// `preserve_order`; inserting in sorted order is correct either way.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
