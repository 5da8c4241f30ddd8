//! # Identity Module
//!
//! Wallet identity issuance. A wallet's identity is an Ed25519 key pair plus
//! the `did:key` identifier derived from its public half.
//!
//! The stack is two layers:
//!
//! 1. **Keypair** ([`crate::crypto::keys`]) - raw Ed25519 material.
//! 2. **DID** ([`did`]) - the public key, SPKI-encoded and base64url'd into
//!    a `did:key` string.
//!
//! [`generate_identity`] runs both in one go and is what wallet provisioning
//! calls.

pub mod did;

pub use did::{did_from_public_key_der, public_key_der_from_did, DidError, DidMethod};

use crate::crypto::keys::IdentityKeypair;
use crate::crypto::SecretKey;
use crate::error::VaultResult;

/// Output of identity generation: everything provisioning needs to persist.
#[derive(Debug, Clone)]
pub struct GeneratedIdentity {
    /// SubjectPublicKeyInfo DER.
    pub public_key_der: Vec<u8>,
    /// 32-byte Ed25519 seed.
    pub private_key: SecretKey,
    /// `did:key:<base64url(public_key_der)>`.
    pub did: String,
}

/// Generate a fresh identity key pair and its DID.
///
/// The only failure that can actually happen here is the OS RNG dying, which
/// panics. The `Result` covers the DER encoder, which doesn't fail for
/// Ed25519 keys in practice.
///
/// # Example
///
/// ```
/// use credvault::identity::{generate_identity, public_key_der_from_did};
///
/// let identity = generate_identity().unwrap();
/// assert!(identity.did.starts_with("did:key:"));
/// assert_eq!(public_key_der_from_did(&identity.did).unwrap(), identity.public_key_der);
/// ```
pub fn generate_identity() -> VaultResult<GeneratedIdentity> {
    let keypair = IdentityKeypair::generate();
    let public_key_der = keypair.public_key_der()?;
    let did = did_from_public_key_der(&public_key_der);

    Ok(GeneratedIdentity {
        public_key_der,
        private_key: keypair.seed(),
        did,
    })
}
