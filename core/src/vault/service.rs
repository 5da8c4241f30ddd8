//! # Vault Service
//!
//! The one object an application holds. It owns the stores, the clock and
//! the runtime config, and exposes every operation the vault supports.
//!
//! ```text
//!                 ┌──────────────┐
//!   caller ─────► │ VaultService │──► WalletStore      (Arc<Wallet>)
//!                 │              │──► CredentialStore  (StoredCredential)
//!                 │              │──► Clock
//!                 └──────┬───────┘
//!                        │ borrows keys from Arc<Wallet>
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!     encryption       hash        share tokens
//! ```
//!
//! Every operation except wallet provisioning only reads shared state, so a
//! `VaultService` behind an `Arc` can be called from any number of threads
//! at once. Provisioning takes a mutex so that two racing `create_wallet`
//! calls still end up with exactly one key set.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::VaultConfig;
use crate::crypto::encryption::encrypt_bytes;
use crate::crypto::{canonical_bytes, decrypt_payload, sha256, EncryptedPayload};
use crate::error::{VaultError, VaultResult};
use crate::identity::DidMethod;
use crate::share::{self, ShareRejection, ShareToken, ShareVerification};
use crate::storage::{CredentialStore, MemoryCredentialStore, MemoryWalletStore, WalletStore};
use crate::vault::credential::{
    CredentialMeta, CredentialStatus, NewCredential, OpenedCredential, StoredCredential,
};
use crate::vault::wallet::{Wallet, WalletPublicView};

/// Entry point for every vault operation.
pub struct VaultService {
    wallets: Arc<dyn WalletStore>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    config: VaultConfig,
    /// Held for the duration of `create_wallet`.
    provisioning: Mutex<()>,
}

impl std::fmt::Debug for VaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VaultService {
    pub fn new(
        wallets: Arc<dyn WalletStore>,
        credentials: Arc<dyn CredentialStore>,
        config: VaultConfig,
    ) -> Self {
        Self::with_clock(wallets, credentials, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        wallets: Arc<dyn WalletStore>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        config: VaultConfig,
    ) -> Self {
        Self {
            wallets,
            credentials,
            clock,
            config,
            provisioning: Mutex::new(()),
        }
    }

    /// A service backed by process-local stores.
    pub fn in_memory(config: VaultConfig) -> Self {
        Self::new(
            Arc::new(MemoryWalletStore::new()),
            Arc::new(MemoryCredentialStore::new()),
            config,
        )
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Wallet
    // -----------------------------------------------------------------------

    /// Provision the wallet if there isn't one yet.
    ///
    /// Returns the existing wallet unchanged when one is already stored, so
    /// calling this twice is harmless. `label` and `method` only apply on
    /// first creation, and are not validated once a wallet exists.
    pub fn create_wallet(&self, label: &str, method: DidMethod) -> VaultResult<WalletPublicView> {
        self.ensure_wallet(label, method).map(|(view, _)| view)
    }

    /// [`create_wallet`](Self::create_wallet), also reporting whether this
    /// call provisioned the wallet (`true`) or found one already stored.
    pub fn ensure_wallet(
        &self,
        label: &str,
        method: DidMethod,
    ) -> VaultResult<(WalletPublicView, bool)> {
        let _guard = self.provisioning.lock();
        if let Some(existing) = self.wallets.get()? {
            tracing::debug!(wallet_id = %existing.id(), "wallet already provisioned");
            return Ok((existing.public_view(), false));
        }

        let label = label.trim();
        if label.is_empty() {
            return Err(VaultError::InvalidRequest("label must not be empty".into()));
        }

        let wallet = Wallet::provision(label, method, self.clock.now())?;
        let wallet = self.wallets.set(wallet)?;
        tracing::info!(
            wallet_id = %wallet.id(),
            did = %wallet.did(),
            method = %wallet.method(),
            "wallet provisioned"
        );
        Ok((wallet.public_view(), true))
    }

    /// Public view of the provisioned wallet.
    pub fn wallet(&self) -> VaultResult<WalletPublicView> {
        Ok(self.require_wallet()?.public_view())
    }

    fn require_wallet(&self) -> VaultResult<Arc<Wallet>> {
        self.wallets.get()?.ok_or(VaultError::WalletNotInitialized)
    }

    // -----------------------------------------------------------------------
    // Payload protection
    // -----------------------------------------------------------------------

    /// Seal `payload` under the wallet's data key and fingerprint it.
    ///
    /// Returns the sealed payload and the lowercase hex SHA-256 of the
    /// canonical plaintext. Both come from the same canonical bytes, so the
    /// hash always describes exactly what was encrypted.
    pub fn encrypt_for_storage(&self, payload: &Value) -> VaultResult<(EncryptedPayload, String)> {
        let wallet = self.require_wallet()?;

        let plaintext = zeroize::Zeroizing::new(canonical_bytes(payload));
        if plaintext.len() > self.config.max_payload_bytes {
            return Err(VaultError::PayloadTooLarge {
                size: plaintext.len(),
                limit: self.config.max_payload_bytes,
            });
        }

        let encrypted = encrypt_bytes(&plaintext, wallet.data_key())?;
        let hash = hex::encode(sha256(&plaintext));
        Ok((encrypted, hash))
    }

    /// Open a payload sealed by [`encrypt_for_storage`](Self::encrypt_for_storage).
    pub fn decrypt_from_storage(&self, encrypted: &EncryptedPayload) -> VaultResult<Value> {
        let wallet = self.require_wallet()?;
        decrypt_payload(encrypted, wallet.data_key()).map_err(|e| {
            tracing::warn!(error = %e, "payload decryption failed");
            e
        })
    }

    // -----------------------------------------------------------------------
    // Share tokens
    // -----------------------------------------------------------------------

    /// Issue a share token for `credential_id`.
    ///
    /// `expires_at` defaults to now plus the configured share lifetime. A
    /// past expiry is accepted; the token is simply dead on arrival. An expiry
    /// the calendar can't represent is `InvalidRequest`.
    pub fn issue_share_token(
        &self,
        credential_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> VaultResult<ShareToken> {
        let wallet = self.require_wallet()?;
        let expires_at = match expires_at {
            Some(expires_at) => expires_at,
            None => self.default_expiry()?,
        };

        let token =
            share::issue_share_token(credential_id, expires_at, wallet.share_signing_key())?;
        tracing::info!(
            credential_id = %credential_id,
            expires_at = %share::format_expiry(token.expires_at),
            "share token issued"
        );
        Ok(token)
    }

    fn default_expiry(&self) -> VaultResult<DateTime<Utc>> {
        self.config
            .share_token_ttl()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| {
                VaultError::InvalidRequest(format!(
                    "share token lifetime of {}s overflows the calendar",
                    self.config.share_token_ttl_secs
                ))
            })
    }

    /// Check a share token. Never fails: every problem becomes `valid = false`
    /// with a reason, including a missing wallet.
    pub fn verify_share_token(&self, token: &str) -> ShareVerification {
        let wallet = match self.wallets.get() {
            Ok(Some(wallet)) => wallet,
            Ok(None) => {
                return ShareVerification::rejected(
                    String::new(),
                    ShareRejection::WalletNotInitialized,
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "wallet lookup failed during token verification");
                return ShareVerification::rejected(
                    String::new(),
                    ShareRejection::WalletNotInitialized,
                );
            }
        };
        share::verify_share_token(token, wallet.share_signing_key(), self.clock.now())
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// Encrypt and persist a new credential.
    pub fn store_credential(&self, new: NewCredential) -> VaultResult<CredentialMeta> {
        if new.issuer.trim().is_empty() {
            return Err(VaultError::InvalidRequest("issuer must not be empty".into()));
        }
        if new.subject.trim().is_empty() {
            return Err(VaultError::InvalidRequest("subject must not be empty".into()));
        }
        if new.types.is_empty() || new.types.iter().any(|t| t.trim().is_empty()) {
            return Err(VaultError::InvalidRequest(
                "type must list at least one non-empty tag".into(),
            ));
        }

        let (encrypted_payload, hash) = self.encrypt_for_storage(&new.payload)?;
        let now = self.clock.now();
        let meta = CredentialMeta {
            id: uuid::Uuid::new_v4().to_string(),
            issuer: new.issuer,
            subject: new.subject,
            types: new.types,
            created_at: now,
            updated_at: now,
            expires_at: new.expires_at,
            status: CredentialStatus::Active,
            hash,
        };

        self.credentials.put(StoredCredential {
            meta: meta.clone(),
            encrypted_payload,
        })?;
        tracing::info!(credential_id = %meta.id, hash = %meta.hash, "credential stored");
        Ok(meta)
    }

    /// Metadata of every stored credential, oldest first.
    pub fn list_credentials(&self) -> VaultResult<Vec<CredentialMeta>> {
        Ok(self
            .credentials
            .list()?
            .into_iter()
            .map(|stored| stored.meta)
            .collect())
    }

    /// Fetch and decrypt one credential.
    pub fn open_credential(&self, id: &str) -> VaultResult<OpenedCredential> {
        let stored = self.find_credential(id)?;
        let payload = self.decrypt_from_storage(&stored.encrypted_payload)?;
        Ok(OpenedCredential {
            meta: stored.meta,
            payload,
        })
    }

    /// Issue a share token for a credential that exists.
    pub fn share_credential(
        &self,
        id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> VaultResult<ShareToken> {
        self.require_wallet()?;
        let stored = self.find_credential(id)?;
        self.issue_share_token(&stored.meta.id, expires_at)
    }

    /// Verify a share token and return the credential it grants.
    pub fn redeem_share_token(&self, token: &str) -> VaultResult<OpenedCredential> {
        let credential_id = self.verify_share_token(token).into_result()?;
        self.open_credential(&credential_id)
    }

    fn find_credential(&self, id: &str) -> VaultResult<StoredCredential> {
        self.credentials
            .get(id)?
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))
    }
}
