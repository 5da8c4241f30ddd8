//! # Stored Credentials
//!
//! A credential at rest is two halves:
//!
//! - [`CredentialMeta`] - issuer, subject, type tags, timestamps, status and
//!   content hash. Plaintext; safe to list.
//! - [`EncryptedPayload`] - the credential body, sealed under the owning
//!   wallet's data key.
//!
//! Status transitions (active -> revoked / expired) are driven from outside;
//! nothing in this crate flips them.
//!
//! No `skip_serializing_if` on anything persisted here: the sled store
//! writes these with bincode, which isn't self-describing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::crypto::EncryptedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Active,
    Revoked,
    Expired,
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialStatus::Active => "active",
            CredentialStatus::Revoked => "revoked",
            CredentialStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Plaintext metadata describing a stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMeta {
    pub id: String,
    pub issuer: String,
    pub subject: String,
    /// Type tags, e.g. `["VerifiableCredential", "UniversityDegreeCredential"]`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: CredentialStatus,
    /// Lowercase hex SHA-256 of the canonical payload.
    pub hash: String,
}

/// Metadata plus sealed payload, as handed to a credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub meta: CredentialMeta,
    pub encrypted_payload: EncryptedPayload,
}

/// A credential submitted for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub issuer: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Opaque body. Schema validation is the caller's job.
    pub payload: Value,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A decrypted credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedCredential {
    pub meta: CredentialMeta,
    pub payload: Value,
}
