//! # DID Issuance
//!
//! Every wallet gets a `did:key` identifier derived from its identity public
//! key:
//!
//! ```text
//! did:key:<base64url(SubjectPublicKeyInfo DER)>
//! ```
//!
//! The identifier is a pure function of the public key, so the same key
//! always yields the same DID and nothing needs to be looked up to produce
//! it. Resolution and proof-of-possession are someone else's problem.
//!
//! ## Method tags
//!
//! Wallets also carry a [`DidMethod`] tag chosen at creation time (`key`,
//! `ion`, or `web`). The tag is recorded and reported back to callers; the
//! identifier itself is always `did:key`, because that's the only method this
//! crate can issue without an external registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::DID_KEY_PREFIX;
use crate::crypto::encoding::{from_base64url, to_base64url};
use crate::crypto::keys::decode_public_key_der;
use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DidError {
    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    #[error("unsupported DID method: {0}")]
    UnsupportedMethod(String),

    #[error("DID does not encode a valid Ed25519 public key")]
    InvalidKey,
}

impl From<DidError> for VaultError {
    fn from(err: DidError) -> Self {
        VaultError::InvalidRequest(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// DidMethod
// ---------------------------------------------------------------------------

/// The closed set of DID method tags a wallet can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidMethod {
    Key,
    Ion,
    Web,
}

impl DidMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DidMethod::Key => "key",
            DidMethod::Ion => "ion",
            DidMethod::Web => "web",
        }
    }
}

impl fmt::Display for DidMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DidMethod {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key" => Ok(DidMethod::Key),
            "ion" => Ok(DidMethod::Ion),
            "web" => Ok(DidMethod::Web),
            other => Err(DidError::UnsupportedMethod(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// did:key derivation
// ---------------------------------------------------------------------------

/// Build `did:key:<base64url(der)>` from an SPKI-encoded public key.
pub fn did_from_public_key_der(public_key_der: &[u8]) -> String {
    format!("{}{}", DID_KEY_PREFIX, to_base64url(public_key_der))
}

/// Recover the SPKI DER public key a `did:key` identifier encodes.
///
/// The bytes are checked to be a well-formed Ed25519 key, not just valid
/// base64.
pub fn public_key_der_from_did(did: &str) -> Result<Vec<u8>, DidError> {
    let parts: Vec<&str> = did.splitn(3, ':').collect();
    if parts.len() != 3 || parts[0] != "did" {
        return Err(DidError::InvalidFormat(
            "DID must have format 'did:<method>:<identifier>'".into(),
        ));
    }
    if parts[1] != DidMethod::Key.as_str() {
        return Err(DidError::UnsupportedMethod(parts[1].to_string()));
    }

    let der = from_base64url(parts[2]).ok_or(DidError::InvalidKey)?;
    decode_public_key_der(&der).map_err(|_| DidError::InvalidKey)?;
    Ok(der)
}
