//! # VaultDb - Persistent Storage Engine
//!
//! sled-backed implementation of both storage traits, for servers that need
//! their wallet to survive a restart.
//!
//! ## Tree Layout
//!
//! | Tree               | Key                | Value                       |
//! |--------------------|--------------------|-----------------------------|
//! | `wallet`           | `"wallet"`         | `bincode(WalletRecord)`     |
//! | `credentials`      | id (UTF-8)         | `bincode(StoredCredential)` |
//! | `credential_order` | sequence (8B BE)   | id (UTF-8)                  |
//!
//! Sequence numbers come from sled's monotonic id generator and are stored
//! big-endian so that lexicographic iteration over `credential_order` is
//! insertion order.
//!
//! ## Secrets at rest
//!
//! The wallet record holds the identity seed and both symmetric keys in the
//! clear. Protecting the data directory (permissions, disk encryption) is the
//! operator's job; this module only makes sure the in-memory copies of those
//! bytes are zeroized once they've been turned back into a [`Wallet`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroize;

use super::{CredentialStore, WalletStore};
use crate::crypto::SecretKey;
use crate::error::{VaultError, VaultResult};
use crate::identity::DidMethod;
use crate::vault::credential::StoredCredential;
use crate::vault::wallet::Wallet;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for VaultError {
    fn from(err: DbError) -> Self {
        VaultError::Storage(err.to_string())
    }
}

/// Key of the single entry in the `wallet` tree.
const WALLET_KEY: &[u8] = b"wallet";

// ---------------------------------------------------------------------------
// On-disk wallet record
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct WalletRecord {
    id: String,
    label: String,
    method: DidMethod,
    did: String,
    created_at: chrono::DateTime<chrono::Utc>,
    public_key: Vec<u8>,
    private_key: Vec<u8>,
    data_key: Vec<u8>,
    share_signing_key: Vec<u8>,
}

impl WalletRecord {
    fn from_wallet(wallet: &Wallet) -> Self {
        Self {
            id: wallet.id().to_string(),
            label: wallet.label().to_string(),
            method: wallet.method(),
            did: wallet.did().to_string(),
            created_at: wallet.created_at(),
            public_key: wallet.public_key().to_vec(),
            private_key: wallet.private_key().expose_secret().to_vec(),
            data_key: wallet.data_key().expose_secret().to_vec(),
            share_signing_key: wallet.share_signing_key().expose_secret().to_vec(),
        }
    }

    fn into_wallet(self) -> VaultResult<Wallet> {
        let secret = |bytes: &[u8], name: &str| {
            SecretKey::try_from_slice(bytes)
                .ok_or_else(|| VaultError::Storage(format!("wallet record has a bad {name}")))
        };
        let private_key = secret(&self.private_key, "private key")?;
        let data_key = secret(&self.data_key, "data key")?;
        let share_signing_key = secret(&self.share_signing_key, "share signing key")?;

        Wallet::restore(
            self.id.clone(),
            self.label.clone(),
            self.method,
            self.did.clone(),
            self.created_at,
            self.public_key.clone(),
            private_key,
            data_key,
            share_signing_key,
        )
    }
}

impl Drop for WalletRecord {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.data_key.zeroize();
        self.share_signing_key.zeroize();
    }
}

// ---------------------------------------------------------------------------
// VaultDb
// ---------------------------------------------------------------------------

/// sled database holding one wallet and its credentials.
///
/// sled is thread-safe; share a `VaultDb` via `Arc` without extra locking.
/// The decoded wallet is cached after the first read since it never changes.
#[derive(Debug, Clone)]
pub struct VaultDb {
    db: Db,
    wallet: Tree,
    credentials: Tree,
    credential_order: Tree,
    cached_wallet: Arc<RwLock<Option<Arc<Wallet>>>>,
}

impl VaultDb {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A database that lives in a temp dir and disappears on drop.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        Ok(Self {
            wallet: db.open_tree("wallet")?,
            credentials: db.open_tree("credentials")?,
            credential_order: db.open_tree("credential_order")?,
            cached_wallet: Arc::new(RwLock::new(None)),
            db,
        })
    }

    /// Number of stored credentials.
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

impl WalletStore for VaultDb {
    fn get(&self) -> VaultResult<Option<Arc<Wallet>>> {
        if let Some(wallet) = self.cached_wallet.read().as_ref() {
            return Ok(Some(Arc::clone(wallet)));
        }

        let Some(bytes) = self.wallet.get(WALLET_KEY).map_err(DbError::from)? else {
            return Ok(None);
        };
        let record: WalletRecord = decode(&bytes)?;
        let wallet = Arc::new(record.into_wallet()?);
        *self.cached_wallet.write() = Some(Arc::clone(&wallet));
        Ok(Some(wallet))
    }

    fn set(&self, wallet: Wallet) -> VaultResult<Arc<Wallet>> {
        let mut bytes = encode(&WalletRecord::from_wallet(&wallet))?;
        let swapped = self
            .wallet
            .compare_and_swap(WALLET_KEY, None as Option<&[u8]>, Some(bytes.as_slice()))
            .map_err(DbError::from);
        bytes.zeroize();

        match swapped? {
            Ok(()) => {
                self.flush()?;
                let wallet = Arc::new(wallet);
                *self.cached_wallet.write() = Some(Arc::clone(&wallet));
                Ok(wallet)
            }
            Err(_) => Err(VaultError::WalletAlreadyExists),
        }
    }
}

impl CredentialStore for VaultDb {
    fn get(&self, id: &str) -> VaultResult<Option<StoredCredential>> {
        match self.credentials.get(id.as_bytes()).map_err(DbError::from)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, credential: StoredCredential) -> VaultResult<()> {
        let id = credential.meta.id.as_bytes();
        let bytes = encode(&credential)?;

        let previous = self.credentials.insert(id, bytes).map_err(DbError::from)?;
        if previous.is_none() {
            let seq = self.db.generate_id().map_err(DbError::from)?;
            self.credential_order
                .insert(seq.to_be_bytes(), id)
                .map_err(DbError::from)?;
        }
        self.flush()?;
        Ok(())
    }

    fn list(&self) -> VaultResult<Vec<StoredCredential>> {
        let mut out = Vec::with_capacity(self.credentials.len());
        for entry in self.credential_order.iter() {
            let (_seq, id) = entry.map_err(DbError::from)?;
            if let Some(bytes) = self.credentials.get(&id).map_err(DbError::from)? {
                out.push(decode(&bytes)?);
            }
        }
        Ok(out)
    }
}
