//! # Storage Module
//!
//! The vault doesn't own persistence; it talks to two narrow traits and lets
//! the embedding application decide what's behind them.
//!
//! ```text
//! mod.rs    - WalletStore / CredentialStore traits
//! memory.rs - in-process stores (tests, ephemeral servers)
//! db.rs     - sled-backed stores that survive restarts
//! ```
//!
//! Both traits are synchronous. Every implementation here is either an
//! in-memory map or sled, neither of which benefits from async.

pub mod db;
pub mod memory;

pub use db::{DbError, VaultDb};
pub use memory::{MemoryCredentialStore, MemoryWalletStore};

use std::sync::Arc;

use crate::error::VaultResult;
use crate::vault::credential::StoredCredential;
use crate::vault::wallet::Wallet;

/// Singleton-per-owner wallet persistence.
pub trait WalletStore: Send + Sync {
    /// The provisioned wallet, if any.
    fn get(&self) -> VaultResult<Option<Arc<Wallet>>>;

    /// Persist a freshly provisioned wallet.
    ///
    /// Fails with [`VaultError::WalletAlreadyExists`](crate::error::VaultError::WalletAlreadyExists)
    /// if one is already stored. Wallets are never replaced.
    fn set(&self, wallet: Wallet) -> VaultResult<Arc<Wallet>>;
}

/// Credential persistence.
pub trait CredentialStore: Send + Sync {
    fn get(&self, id: &str) -> VaultResult<Option<StoredCredential>>;

    /// Insert, or replace the credential with the same id in place.
    fn put(&self, credential: StoredCredential) -> VaultResult<()>;

    /// All credentials in insertion order.
    fn list(&self) -> VaultResult<Vec<StoredCredential>>;
}
