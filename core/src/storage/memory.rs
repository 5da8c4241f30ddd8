//! # In-Memory Stores
//!
//! Process-local implementations of the storage traits. Everything is gone
//! when the process exits, which is exactly what tests and throwaway demo
//! servers want.

use parking_lot::RwLock;
use std::sync::Arc;

use super::{CredentialStore, WalletStore};
use crate::error::{VaultError, VaultResult};
use crate::vault::credential::StoredCredential;
use crate::vault::wallet::Wallet;

#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    wallet: RwLock<Option<Arc<Wallet>>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn get(&self) -> VaultResult<Option<Arc<Wallet>>> {
        Ok(self.wallet.read().clone())
    }

    fn set(&self, wallet: Wallet) -> VaultResult<Arc<Wallet>> {
        let mut slot = self.wallet.write();
        if slot.is_some() {
            return Err(VaultError::WalletAlreadyExists);
        }
        let wallet = Arc::new(wallet);
        *slot = Some(Arc::clone(&wallet));
        Ok(wallet)
    }
}

/// Credentials in a `Vec`, so listing order is insertion order.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Vec<StoredCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, id: &str) -> VaultResult<Option<StoredCredential>> {
        Ok(self
            .credentials
            .read()
            .iter()
            .find(|c| c.meta.id == id)
            .cloned())
    }

    fn put(&self, credential: StoredCredential) -> VaultResult<()> {
        let mut credentials = self.credentials.write();
        match credentials
            .iter_mut()
            .find(|c| c.meta.id == credential.meta.id)
        {
            Some(existing) => *existing = credential,
            None => credentials.push(credential),
        }
        Ok(())
    }

    fn list(&self) -> VaultResult<Vec<StoredCredential>> {
        Ok(self.credentials.read().clone())
    }
}
