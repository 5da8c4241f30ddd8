//! # Wallet
//!
//! A [`Wallet`] is one owner's complete key material: the Ed25519 identity,
//! the DID derived from it, and the two symmetric secrets. It is created once
//! and never mutated afterwards. Rotation is out of scope, so every field is
//! read-only and the whole thing is shared as `Arc<Wallet>`.
//!
//! ## What leaves the process
//!
//! `Wallet` does not implement `Serialize`. The only exposable shape is
//! [`WalletPublicView`]: id, label, method, DID, public key, creation time.
//! Durable stores that genuinely need the secrets call the accessors and
//! build their own record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::encoding::to_base64url;
use crate::crypto::keys::IdentityKeypair;
use crate::crypto::{provision_secrets, SecretKey};
use crate::error::{VaultError, VaultResult};
use crate::identity::{did_from_public_key_der, generate_identity, DidMethod};

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A provisioned wallet and all of its key material.
///
/// `Debug` is derived, but every secret field prints as `<redacted>`.
#[derive(Debug)]
pub struct Wallet {
    id: String,
    label: String,
    method: DidMethod,
    did: String,
    created_at: DateTime<Utc>,
    /// SubjectPublicKeyInfo DER.
    public_key: Vec<u8>,
    private_key: SecretKey,
    data_key: SecretKey,
    share_signing_key: SecretKey,
}

impl Wallet {
    /// Generate a brand-new wallet: identity key pair, DID, and both secrets.
    pub fn provision(label: &str, method: DidMethod, now: DateTime<Utc>) -> VaultResult<Self> {
        let identity = generate_identity()?;
        let secrets = provision_secrets();

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.to_string(),
            method,
            did: identity.did,
            created_at: now,
            public_key: identity.public_key_der,
            private_key: identity.private_key,
            data_key: secrets.data_key,
            share_signing_key: secrets.share_signing_key,
        })
    }

    /// Reassemble a wallet loaded from durable storage.
    ///
    /// Re-derives the public key from the private seed and the DID from the
    /// public key, and refuses the record if either disagrees with what was
    /// stored. A mismatch means the record was corrupted or edited.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: String,
        label: String,
        method: DidMethod,
        did: String,
        created_at: DateTime<Utc>,
        public_key: Vec<u8>,
        private_key: SecretKey,
        data_key: SecretKey,
        share_signing_key: SecretKey,
    ) -> VaultResult<Self> {
        let derived = IdentityKeypair::from_seed(&private_key).public_key_der()?;
        if derived != public_key {
            return Err(VaultError::Storage(
                "wallet record public key does not match private key".into(),
            ));
        }
        if did_from_public_key_der(&public_key) != did {
            return Err(VaultError::Storage(
                "wallet record DID does not match public key".into(),
            ));
        }

        Ok(Self {
            id,
            label,
            method,
            did,
            created_at,
            public_key,
            private_key,
            data_key,
            share_signing_key,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn method(&self) -> DidMethod {
        self.method
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// SubjectPublicKeyInfo DER bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The Ed25519 seed. Only durable stores should need this.
    pub fn private_key(&self) -> &SecretKey {
        &self.private_key
    }

    /// Key that seals credential payloads.
    pub fn data_key(&self) -> &SecretKey {
        &self.data_key
    }

    /// Key that MACs share tokens.
    pub fn share_signing_key(&self) -> &SecretKey {
        &self.share_signing_key
    }

    /// The caller-safe projection of this wallet.
    pub fn public_view(&self) -> WalletPublicView {
        WalletPublicView {
            id: self.id.clone(),
            label: self.label.clone(),
            method: self.method,
            did: self.did.clone(),
            created_at: self.created_at,
            public_key: to_base64url(&self.public_key),
        }
    }
}

// ---------------------------------------------------------------------------
// Public view
// ---------------------------------------------------------------------------

/// Everything about a wallet that may be shown to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPublicView {
    pub id: String,
    pub label: String,
    pub method: DidMethod,
    pub did: String,
    pub created_at: DateTime<Utc>,
    /// SubjectPublicKeyInfo DER, URL-safe base64.
    pub public_key: String,
}
